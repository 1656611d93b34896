//! Contiguous word-backed storage blocks.
//!
//! A [`StorageBlock`] owns (or wraps) one contiguous buffer sized via
//! [`StorageDims`]. Backing storage is a `Vec<u64>` viewed as bytes, so
//! every offset padded to a scalar kind's natural alignment yields a
//! correctly aligned typed view — a `Vec<u8>` would only guarantee
//! byte alignment of the base pointer.
//!
//! Blocks never resize. Growth lives one level up: allocate a new block,
//! copy, swap.

use bytemuck::{cast_slice, cast_slice_mut};
use marrow_core::{StorageDims, StorageError, StorageFlags};

const WORD_BYTES: usize = std::mem::size_of::<u64>();

/// One contiguous buffer with capacity bookkeeping and an ownership flag.
#[derive(Clone, Debug)]
pub struct StorageBlock {
    item_size_bytes: usize,
    flags: StorageFlags,
    capacity: usize,
    size_bytes: usize,
    owned: bool,
    words: Vec<u64>,
}

impl StorageBlock {
    /// Allocate a fresh zero-initialized block for `min_capacity` items of
    /// `item_size_bytes` each, rounded per `flags`.
    pub fn allocate(
        item_size_bytes: usize,
        min_capacity: usize,
        flags: StorageFlags,
    ) -> Result<StorageBlock, StorageError> {
        let dims = StorageDims::compute(item_size_bytes, min_capacity, flags)?;
        let words = vec![0u64; dims.size_bytes.div_ceil(WORD_BYTES)];
        Ok(StorageBlock {
            item_size_bytes,
            flags,
            capacity: dims.capacity,
            size_bytes: dims.size_bytes,
            owned: true,
            words,
        })
    }

    /// Wrap a caller-supplied word buffer without zeroing it.
    ///
    /// The buffer's contents are taken as-is; the caller's initialization
    /// convention applies. Fails with [`StorageError::BufferTooSmall`] if
    /// the buffer cannot hold the computed size.
    pub fn wrap(
        item_size_bytes: usize,
        min_capacity: usize,
        flags: StorageFlags,
        words: Vec<u64>,
    ) -> Result<StorageBlock, StorageError> {
        let dims = StorageDims::compute(item_size_bytes, min_capacity, flags)?;
        let provided_bytes = words.len() * WORD_BYTES;
        if provided_bytes < dims.size_bytes {
            return Err(StorageError::BufferTooSmall {
                required_bytes: dims.size_bytes,
                provided_bytes,
            });
        }
        Ok(StorageBlock {
            item_size_bytes,
            flags,
            capacity: dims.capacity,
            size_bytes: dims.size_bytes,
            owned: false,
            words,
        })
    }

    /// The block's contents as bytes, trimmed to the computed size.
    pub fn bytes(&self) -> &[u8] {
        &cast_slice(&self.words)[..self.size_bytes]
    }

    /// The block's contents as mutable bytes, trimmed to the computed size.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut cast_slice_mut(&mut self.words)[..self.size_bytes]
    }

    /// Zero the entire block in word-sized stores.
    pub fn zero_all(&mut self) {
        self.words.fill(0);
    }

    /// Item capacity after rounding.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Usable byte size after rounding.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Item size this block was dimensioned for.
    pub fn item_size_bytes(&self) -> usize {
        self.item_size_bytes
    }

    /// The sizing flags this block was created with.
    pub fn flags(&self) -> StorageFlags {
        self.flags
    }

    /// Whether the block allocated its own buffer (`false` for [`StorageBlock::wrap`]).
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Memory footprint of the backing buffer in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Consume the block and return the backing word buffer.
    pub fn into_words(self) -> Vec<u64> {
        self.words
    }
}
