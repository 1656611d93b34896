//! The growable structured arena.

use bytemuck::{cast_slice, cast_slice_mut};
use indexmap::IndexMap;
use marrow_core::{round_up_pow2, FieldDef, Scalar, StorageDims, StorageError, StorageFlags};

use crate::block::StorageBlock;
use crate::layout::{StructLayout, Topology};

/// Whether a capacity operation replaced the backing buffer.
///
/// `Yes` means every previously derived view or recorded buffer range is
/// now backed by freed memory. Views obtained from the array itself are
/// re-borrowed and therefore always fresh; this signal exists for
/// callers mirroring the buffer outside the borrow checker's sight
/// (GPU uploads, cached upload ranges).
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Realloc {
    /// The backing buffer is unchanged.
    No,
    /// The backing buffer was replaced; external mirrors are stale.
    Yes,
}

impl Realloc {
    /// `true` if externally held views/ranges must be re-fetched.
    pub fn views_invalidated(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// A growable arena storing a fixed set of typed fields in one buffer.
///
/// The field set is fixed at construction; capacity grows on demand
/// (rounded up to the item-count unit), and the logical element count is
/// tracked separately from physical capacity. Shrinking the logical
/// count eagerly zero-fills the vacated tail of every field, so growing
/// back into that range always observes zeroed data.
///
/// # Example
///
/// ```
/// use marrow_core::{FieldDef, ScalarKind};
/// use marrow_arena::StructuredArray;
///
/// let mut bodies = StructuredArray::new(
///     64,
///     vec![
///         FieldDef::new("position", ScalarKind::F32, 3),
///         FieldDef::new("mass", ScalarKind::F32, 1),
///         FieldDef::new("awake", ScalarKind::U8, 1),
///     ],
/// )
/// .unwrap();
///
/// let mass = bodies.field_index("mass").unwrap();
/// bodies.field_slice_mut::<f32>(mass)[0] = 10.0;
/// assert_eq!(bodies.field_slice::<f32>(mass)[0], 10.0);
/// ```
#[derive(Clone, Debug)]
pub struct StructuredArray {
    block: StorageBlock,
    layout: StructLayout,
    fields: Vec<FieldDef>,
    names: IndexMap<String, usize>,
    item_size_bytes: usize,
    len: usize,
}

impl StructuredArray {
    /// Create a struct-of-arrays arena with at least `initial_capacity`
    /// slots (rounded up to the item-count unit).
    pub fn new(
        initial_capacity: usize,
        fields: Vec<FieldDef>,
    ) -> Result<StructuredArray, StorageError> {
        Self::with_topology(initial_capacity, fields, Topology::StructOfArrays)
    }

    /// Create an arena with an explicit topology.
    ///
    /// `StructOfArrays` is the right choice for per-component managers;
    /// `ArrayOfStructs` exists for interleaved consumers that still want
    /// growth semantics.
    ///
    /// # Panics
    ///
    /// Panics on duplicate field names — duplicates would make by-name
    /// lookup silently resolve to the wrong slot.
    pub fn with_topology(
        initial_capacity: usize,
        fields: Vec<FieldDef>,
        topology: Topology,
    ) -> Result<StructuredArray, StorageError> {
        if fields.is_empty() {
            return Err(StorageError::EmptyFieldList);
        }

        let mut names = IndexMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let previous = names.insert(field.name.clone(), index);
            assert!(
                previous.is_none(),
                "duplicate field name '{}' in arena field list",
                field.name
            );
        }

        let mut elem_sizes = Vec::with_capacity(fields.len());
        for field in &fields {
            elem_sizes.push(field.elem_size_bytes()?);
        }
        let item_size_bytes = summed_item_size(&elem_sizes)?;

        let capacity = Self::round_capacity(item_size_bytes, initial_capacity)?;
        let layout = StructLayout::compute(&fields, topology, capacity)?;
        let block = StorageBlock::allocate(1, layout.total_bytes().max(1), StorageFlags::NONE)?;

        Ok(StructuredArray {
            block,
            layout,
            fields,
            names,
            item_size_bytes,
            len: 0,
        })
    }

    fn round_capacity(item_size_bytes: usize, min_capacity: usize) -> Result<usize, StorageError> {
        let dims = StorageDims::compute(
            item_size_bytes,
            min_capacity,
            StorageFlags::ITEM_COUNT_MULTIPLE,
        )?;
        Ok(dims.capacity)
    }

    /// Grow physical capacity to at least `min_capacity` slots.
    ///
    /// Returns [`Realloc::No`] without touching storage when the rounded
    /// request does not exceed the current capacity. On growth the entire
    /// old contents are re-laid out into the new buffer — a per-field
    /// copy, because struct-of-arrays sub-block offsets depend on
    /// capacity — before the old block is dropped.
    pub fn reserve(&mut self, min_capacity: usize) -> Result<Realloc, StorageError> {
        if min_capacity == 0 {
            return Err(StorageError::ZeroCapacity);
        }
        let new_capacity = Self::round_capacity(self.item_size_bytes, min_capacity)?;
        if new_capacity <= self.capacity() {
            return Ok(Realloc::No);
        }

        let new_layout = StructLayout::compute(&self.fields, self.topology(), new_capacity)?;
        let mut new_block =
            StorageBlock::allocate(1, new_layout.total_bytes().max(1), StorageFlags::NONE)?;

        {
            let old_bytes = self.block.bytes();
            let new_bytes = new_block.bytes_mut();
            match self.topology() {
                Topology::StructOfArrays => {
                    for (old_slot, new_slot) in
                        self.layout.slots().iter().zip(new_layout.slots())
                    {
                        let span = old_slot.elem_size_bytes * self.layout.capacity();
                        new_bytes[new_slot.offset..new_slot.offset + span]
                            .copy_from_slice(&old_bytes[old_slot.offset..old_slot.offset + span]);
                    }
                }
                Topology::ArrayOfStructs => {
                    // Stride is capacity-independent, so one flat copy suffices.
                    let span = self.layout.total_bytes();
                    new_bytes[..span].copy_from_slice(&old_bytes[..span]);
                }
            }
        }

        self.block = new_block;
        self.layout = new_layout;
        Ok(Realloc::Yes)
    }

    /// Set the logical element count.
    ///
    /// Growing past capacity reserves the next power of two ≥ `new_len`
    /// (amortizing future growth). Shrinking eagerly zero-fills the
    /// vacated range `[new_len, old_len)` in every field.
    pub fn resize(&mut self, new_len: usize) -> Result<Realloc, StorageError> {
        let realloc = if new_len > self.capacity() {
            self.reserve(round_up_pow2(new_len))?
        } else {
            Realloc::No
        };
        if new_len < self.len {
            self.zero_elements(new_len, self.len);
        }
        self.len = new_len;
        Ok(realloc)
    }

    /// Append one logical slot, growing capacity by 1.5× (ceiling) only
    /// when the array is exactly full. Returns the index of the new slot
    /// alongside the reallocation signal.
    pub fn push(&mut self) -> Result<(usize, Realloc), StorageError> {
        let realloc = if self.len == self.capacity() {
            let grown = self.capacity() + self.capacity().div_ceil(2);
            self.reserve(grown)?
        } else {
            Realloc::No
        };
        let index = self.len;
        self.len += 1;
        Ok((index, realloc))
    }

    /// Reset the logical count to zero and zero the whole backing buffer
    /// in one word-granular pass.
    pub fn clear(&mut self) {
        self.len = 0;
        self.block.zero_all();
    }

    fn zero_elements(&mut self, from: usize, to: usize) {
        match self.topology() {
            Topology::StructOfArrays => {
                for slot in self.layout.slots().iter() {
                    let start = slot.offset + slot.elem_size_bytes * from;
                    let end = slot.offset + slot.elem_size_bytes * to;
                    self.block.bytes_mut()[start..end].fill(0);
                }
            }
            Topology::ArrayOfStructs => {
                let stride = self.layout.stride_bytes().unwrap_or(0);
                self.block.bytes_mut()[stride * from..stride * to].fill(0);
            }
        }
    }

    /// Typed view over a field's full capacity (struct-of-arrays only).
    ///
    /// The slice holds `capacity * components` elements. Fresh on every
    /// call; it borrows `self`, so it cannot outlive a capacity change.
    ///
    /// # Panics
    ///
    /// Panics if `field` is out of bounds, if `T` does not match the
    /// field's kind, or if the topology is array-of-structs. All three
    /// are programmer errors, not runtime conditions.
    pub fn field_slice<T: Scalar>(&self, field: usize) -> &[T] {
        cast_slice(self.soa_field_bytes(field, T::KIND))
    }

    /// Mutable typed view over a field's full capacity (struct-of-arrays
    /// only). Same contract as [`StructuredArray::field_slice`].
    pub fn field_slice_mut<T: Scalar>(&mut self, field: usize) -> &mut [T] {
        let range = self.soa_field_range(field, Some(T::KIND));
        cast_slice_mut(&mut self.block.bytes_mut()[range])
    }

    /// Raw byte view over a field's sub-block (struct-of-arrays only).
    pub fn field_bytes(&self, field: usize) -> &[u8] {
        let range = self.soa_field_range(field, None);
        &self.block.bytes()[range]
    }

    /// Mutable raw byte view over a field's sub-block (struct-of-arrays only).
    pub fn field_bytes_mut(&mut self, field: usize) -> &mut [u8] {
        let range = self.soa_field_range(field, None);
        &mut self.block.bytes_mut()[range]
    }

    fn soa_field_bytes(&self, field: usize, kind: marrow_core::ScalarKind) -> &[u8] {
        let range = self.soa_field_range(field, Some(kind));
        &self.block.bytes()[range]
    }

    fn soa_field_range(
        &self,
        field: usize,
        view_kind: Option<marrow_core::ScalarKind>,
    ) -> std::ops::Range<usize> {
        assert_eq!(
            self.topology(),
            Topology::StructOfArrays,
            "field views require struct-of-arrays topology"
        );
        let slot = self.layout.slot(field);
        if let Some(kind) = view_kind {
            assert_eq!(
                slot.kind.view_kind(),
                kind,
                "field '{}' stores {}, view requested {}",
                self.fields[field].name,
                slot.kind,
                kind
            );
        }
        let span = slot.elem_size_bytes * self.layout.capacity();
        slot.offset..slot.offset + span
    }

    /// Look up a field's index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Logical element count.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the logical element count is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Physical slot capacity.
    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The field definitions, in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// The arena's topology.
    pub fn topology(&self) -> Topology {
        self.layout.topology()
    }

    /// The current layout descriptor.
    pub fn layout(&self) -> &StructLayout {
        &self.layout
    }

    /// Memory footprint of the backing buffer in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.block.memory_bytes()
    }
}

/// Sum per-field element sizes into one item size.
///
/// Accumulated in u128 so an overflowing request is reported at its true
/// size rather than clamped.
fn summed_item_size(elem_sizes: &[usize]) -> Result<usize, StorageError> {
    let total: u128 = elem_sizes.iter().map(|&s| s as u128).sum();
    usize::try_from(total).map_err(|_| StorageError::AllocationTooLarge {
        requested_bytes: total,
    })
}
