//! Alignment and storage sizing arithmetic.
//!
//! Pure functions — nothing here allocates. [`StorageDims::compute`] is
//! the single place capacity and byte-size rounding policy lives; the
//! storage crates never roll their own.

use std::ops::BitOr;

use crate::error::StorageError;

/// Capacity rounding unit applied by [`StorageFlags::ITEM_COUNT_MULTIPLE`].
pub const ITEM_COUNT_UNIT: usize = 32;

/// Byte-size rounding unit applied by [`StorageFlags::PAGE_MULTIPLE`]:
/// one 64 KiB page, the granularity bulk-transfer backends grow buffers by.
pub const PAGE_SIZE_BYTES: usize = 65536;

/// Round `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two; this is a precondition, checked
/// only in debug builds. The addition is unchecked — callers sizing
/// untrusted values go through [`StorageDims::compute`], which keeps the
/// arithmetic checked end to end.
pub fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two(), "alignment must be a power of two");
    (value + alignment - 1) & !(alignment - 1)
}

/// Round `value` down to the previous multiple of `alignment`.
///
/// Same power-of-two precondition as [`align_up`].
pub fn align_down(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two(), "alignment must be a power of two");
    value & !(alignment - 1)
}

/// Smallest power of two greater than or equal to `n`; `0` maps to `1`.
///
/// Powers of two are fixed points.
pub fn round_up_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Checked variant of [`align_up`] for the sizing path.
fn checked_align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    Some(value.checked_add(alignment - 1)? & !(alignment - 1))
}

/// Bit set of storage sizing policies.
///
/// Flags are independent and combine with `|`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StorageFlags(u8);

impl StorageFlags {
    /// No rounding: capacity and byte size are taken as requested.
    pub const NONE: StorageFlags = StorageFlags(0);
    /// Round capacity up to a multiple of [`ITEM_COUNT_UNIT`].
    pub const ITEM_COUNT_MULTIPLE: StorageFlags = StorageFlags(1);
    /// Round the final byte size up to a multiple of [`PAGE_SIZE_BYTES`].
    pub const PAGE_MULTIPLE: StorageFlags = StorageFlags(1 << 1);

    /// Whether every flag in `other` is set in `self`.
    pub fn contains(self, other: StorageFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flags are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for StorageFlags {
    type Output = StorageFlags;

    fn bitor(self, rhs: StorageFlags) -> StorageFlags {
        StorageFlags(self.0 | rhs.0)
    }
}

/// Computed storage dimensions: rounded capacity and total byte size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageDims {
    /// Slot capacity after any [`StorageFlags::ITEM_COUNT_MULTIPLE`] rounding.
    pub capacity: usize,
    /// Total byte size after any [`StorageFlags::PAGE_MULTIPLE`] rounding.
    ///
    /// Before page rounding this is exactly `item_size_bytes * capacity`,
    /// and it is never smaller than the requested minimum.
    pub size_bytes: usize,
}

impl StorageDims {
    /// Compute storage dimensions for `min_capacity` items of
    /// `item_size_bytes` each, under the given rounding flags.
    ///
    /// # Errors
    ///
    /// - [`StorageError::ZeroItemSize`] / [`StorageError::ZeroCapacity`]
    ///   for zero inputs.
    /// - [`StorageError::AllocationTooLarge`] if any intermediate exceeds
    ///   `usize`.
    pub fn compute(
        item_size_bytes: usize,
        min_capacity: usize,
        flags: StorageFlags,
    ) -> Result<StorageDims, StorageError> {
        if item_size_bytes == 0 {
            return Err(StorageError::ZeroItemSize);
        }
        if min_capacity == 0 {
            return Err(StorageError::ZeroCapacity);
        }

        let too_large = || StorageError::AllocationTooLarge {
            requested_bytes: item_size_bytes as u128 * min_capacity as u128,
        };

        let capacity = if flags.contains(StorageFlags::ITEM_COUNT_MULTIPLE) {
            checked_align_up(min_capacity, ITEM_COUNT_UNIT).ok_or_else(too_large)?
        } else {
            min_capacity
        };

        let mut size_bytes = item_size_bytes.checked_mul(capacity).ok_or_else(too_large)?;
        if flags.contains(StorageFlags::PAGE_MULTIPLE) {
            size_bytes = checked_align_up(size_bytes, PAGE_SIZE_BYTES).ok_or_else(too_large)?;
        }

        Ok(StorageDims {
            capacity,
            size_bytes,
        })
    }
}
