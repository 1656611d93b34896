//! Structured layout computation: fields + topology → offsets.
//!
//! [`StructLayout::compute`] is a pure function — no live storage is
//! involved, so layout arithmetic is testable without allocating a byte.
//! Identical `(fields, topology, capacity)` input always produces
//! identical output.

use std::fmt;

use marrow_core::{align_up, FieldDef, ScalarKind, StorageError};

/// How fields are arranged within the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    /// All fields of one element interleaved; elements follow each other
    /// at a fixed stride. The natural layout for vertex streams.
    ArrayOfStructs,
    /// Each field's values for all elements contiguous; field blocks
    /// concatenated. The natural layout for component managers.
    StructOfArrays,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArrayOfStructs => f.write_str("array-of-structs"),
            Self::StructOfArrays => f.write_str("struct-of-arrays"),
        }
    }
}

/// One field's resolved position within a [`StructLayout`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSlot {
    /// Byte offset. For `ArrayOfStructs` this is the offset within one
    /// element's stride; for `StructOfArrays` it is the offset of the
    /// field's whole sub-block within the buffer.
    pub offset: usize,
    /// Bytes per element for this field (`components * kind size`). Also
    /// the per-field stride in `StructOfArrays`.
    pub elem_size_bytes: usize,
    /// Element kind.
    pub kind: ScalarKind,
    /// Components per element.
    pub components: u32,
}

/// Immutable layout descriptor derived from an ordered field list.
///
/// Offsets are monotonically increasing and non-overlapping; every field
/// start is padded to the field kind's natural alignment so typed views
/// over word-aligned storage stay valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructLayout {
    topology: Topology,
    capacity: usize,
    stride_bytes: Option<usize>,
    total_bytes: usize,
    slots: Vec<FieldSlot>,
}

impl StructLayout {
    /// Compute a layout for `fields` over `capacity` elements.
    ///
    /// # Errors
    ///
    /// - [`StorageError::EmptyFieldList`] for zero fields.
    /// - [`StorageError::ZeroCapacity`] for zero capacity.
    /// - [`StorageError::ZeroComponents`] if a field declares no components.
    /// - [`StorageError::AllocationTooLarge`] if the total byte size
    ///   overflows.
    pub fn compute(
        fields: &[FieldDef],
        topology: Topology,
        capacity: usize,
    ) -> Result<StructLayout, StorageError> {
        if fields.is_empty() {
            return Err(StorageError::EmptyFieldList);
        }
        if capacity == 0 {
            return Err(StorageError::ZeroCapacity);
        }
        for field in fields {
            if field.components == 0 {
                return Err(StorageError::ZeroComponents {
                    field: field.name.clone(),
                });
            }
        }

        match topology {
            Topology::ArrayOfStructs => Self::compute_aos(fields, capacity),
            Topology::StructOfArrays => Self::compute_soa(fields, capacity),
        }
    }

    fn compute_aos(fields: &[FieldDef], capacity: usize) -> Result<StructLayout, StorageError> {
        let mut slots = Vec::with_capacity(fields.len());
        let mut cursor = 0usize;
        let mut max_align = 1usize;

        for field in fields {
            let elem_size = field.elem_size_bytes()?;
            let align = field.kind.size_bytes();
            max_align = max_align.max(align);
            // Pad to the field kind's natural alignment within the stride.
            cursor = align_up(cursor, align);
            slots.push(FieldSlot {
                offset: cursor,
                elem_size_bytes: elem_size,
                kind: field.kind,
                components: field.components,
            });
            cursor = cursor
                .checked_add(elem_size)
                .ok_or_else(|| too_large(cursor, elem_size))?;
        }

        // Each element must start aligned for every sub-field.
        let stride = align_up(cursor, max_align);
        let total_bytes = stride
            .checked_mul(capacity)
            .ok_or_else(|| too_large(stride, capacity))?;

        Ok(StructLayout {
            topology: Topology::ArrayOfStructs,
            capacity,
            stride_bytes: Some(stride),
            total_bytes,
            slots,
        })
    }

    fn compute_soa(fields: &[FieldDef], capacity: usize) -> Result<StructLayout, StorageError> {
        let mut slots = Vec::with_capacity(fields.len());
        let mut cursor = 0usize;

        for field in fields {
            let elem_size = field.elem_size_bytes()?;
            let block_size = elem_size
                .checked_mul(capacity)
                .ok_or_else(|| too_large(elem_size, capacity))?;
            // Pad the sub-block start so typed views over the block are aligned.
            cursor = align_up(cursor, field.kind.size_bytes());
            slots.push(FieldSlot {
                offset: cursor,
                elem_size_bytes: elem_size,
                kind: field.kind,
                components: field.components,
            });
            cursor = cursor
                .checked_add(block_size)
                .ok_or_else(|| too_large(cursor, block_size))?;
        }

        Ok(StructLayout {
            topology: Topology::StructOfArrays,
            capacity,
            stride_bytes: None,
            total_bytes: cursor,
            slots,
        })
    }

    /// The topology this layout was computed under.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Element capacity this layout spans.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Per-element stride in bytes. `None` for `StructOfArrays`, where
    /// the stride is per-field ([`FieldSlot::elem_size_bytes`]).
    pub fn stride_bytes(&self) -> Option<usize> {
        self.stride_bytes
    }

    /// Total byte size of a buffer holding this layout.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.slots.len()
    }

    /// The resolved slot for a field, by declaration order.
    ///
    /// # Panics
    ///
    /// Panics if `field` is out of bounds — field indices are fixed at
    /// construction, so an out-of-range index is a programmer error.
    pub fn slot(&self, field: usize) -> &FieldSlot {
        &self.slots[field]
    }

    /// All slots in declaration order.
    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }
}

fn too_large(a: usize, b: usize) -> StorageError {
    StorageError::AllocationTooLarge {
        requested_bytes: a as u128 * b as u128,
    }
}
