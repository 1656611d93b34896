//! Fixed-capacity arena variants.
//!
//! Simpler siblings of [`StructuredArray`](crate::StructuredArray) for
//! when the maximum element count is known upfront: no growth API, no
//! capacity rounding, no reallocation signal. [`FixedMultiArray`] is the
//! struct-of-arrays variant; [`FixedStructArray`] is the interleaved
//! array-of-structs variant with per-lane accessors.

use bytemuck::{bytes_of, cast_slice, cast_slice_mut, pod_read_unaligned};
use indexmap::IndexMap;
use marrow_core::{FieldDef, Scalar, StorageError, StorageFlags};

use crate::block::StorageBlock;
use crate::layout::{StructLayout, Topology};

fn build_name_table(fields: &[FieldDef]) -> IndexMap<String, usize> {
    let mut names = IndexMap::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let previous = names.insert(field.name.clone(), index);
        assert!(
            previous.is_none(),
            "duplicate field name '{}' in field list",
            field.name
        );
    }
    names
}

/// Fixed-capacity struct-of-arrays storage.
///
/// Capacity is taken verbatim (no item-unit rounding) and never changes,
/// so field views stay valid for the life of the array as far as the
/// borrow checker allows.
#[derive(Clone, Debug)]
pub struct FixedMultiArray {
    block: StorageBlock,
    layout: StructLayout,
    fields: Vec<FieldDef>,
    names: IndexMap<String, usize>,
}

impl FixedMultiArray {
    /// Allocate a zeroed fixed array of exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics on duplicate field names.
    pub fn new(capacity: usize, fields: Vec<FieldDef>) -> Result<FixedMultiArray, StorageError> {
        let names = build_name_table(&fields);
        let layout = StructLayout::compute(&fields, Topology::StructOfArrays, capacity)?;
        let block = StorageBlock::allocate(1, layout.total_bytes().max(1), StorageFlags::NONE)?;
        Ok(FixedMultiArray {
            block,
            layout,
            fields,
            names,
        })
    }

    /// Build a fixed array over a caller-supplied word buffer.
    ///
    /// The buffer is not zeroed; it must be at least as large as the
    /// computed layout, else [`StorageError::BufferTooSmall`].
    pub fn from_words(
        capacity: usize,
        fields: Vec<FieldDef>,
        words: Vec<u64>,
    ) -> Result<FixedMultiArray, StorageError> {
        let names = build_name_table(&fields);
        let layout = StructLayout::compute(&fields, Topology::StructOfArrays, capacity)?;
        let block = StorageBlock::wrap(1, layout.total_bytes().max(1), StorageFlags::NONE, words)?;
        Ok(FixedMultiArray {
            block,
            layout,
            fields,
            names,
        })
    }

    /// Typed view over a field's full capacity.
    ///
    /// # Panics
    ///
    /// Panics on a bad field index or element-type mismatch.
    pub fn field_slice<T: Scalar>(&self, field: usize) -> &[T] {
        cast_slice(&self.block.bytes()[self.field_range(field, Some(T::KIND))])
    }

    /// Mutable typed view over a field's full capacity.
    pub fn field_slice_mut<T: Scalar>(&mut self, field: usize) -> &mut [T] {
        let range = self.field_range(field, Some(T::KIND));
        cast_slice_mut(&mut self.block.bytes_mut()[range])
    }

    /// Raw byte view over a field's sub-block.
    pub fn field_bytes(&self, field: usize) -> &[u8] {
        &self.block.bytes()[self.field_range(field, None)]
    }

    fn field_range(
        &self,
        field: usize,
        view_kind: Option<marrow_core::ScalarKind>,
    ) -> std::ops::Range<usize> {
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

    /// Zero the whole buffer.
    pub fn fill_zero(&mut self) {
        self.block.zero_all();
    }

    /// Fixed slot capacity.
    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Whether the array allocated its own buffer.
    pub fn is_owned(&self) -> bool {
        self.block.is_owned()
    }

    /// Memory footprint in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.block.memory_bytes()
    }
}

/// Fixed-capacity array-of-structs storage.
///
/// Elements are interleaved at a fixed stride; access is per element and
/// per lane rather than per whole field, since one field's values are
/// not contiguous in this topology.
#[derive(Clone, Debug)]
pub struct FixedStructArray {
    block: StorageBlock,
    layout: StructLayout,
    fields: Vec<FieldDef>,
    names: IndexMap<String, usize>,
}

impl FixedStructArray {
    /// Allocate a zeroed interleaved array of exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics on duplicate field names.
    pub fn new(capacity: usize, fields: Vec<FieldDef>) -> Result<FixedStructArray, StorageError> {
        let names = build_name_table(&fields);
        let layout = StructLayout::compute(&fields, Topology::ArrayOfStructs, capacity)?;
        let block = StorageBlock::allocate(1, layout.total_bytes().max(1), StorageFlags::NONE)?;
        Ok(FixedStructArray {
            block,
            layout,
            fields,
            names,
        })
    }

    /// One element's full stride window, padding included.
    ///
    /// # Panics
    ///
    /// Panics if `element >= capacity`.
    pub fn element_bytes(&self, element: usize) -> &[u8] {
        let stride = self.stride_bytes();
        assert!(element < self.capacity(), "element {element} out of bounds");
        &self.block.bytes()[element * stride..(element + 1) * stride]
    }

    /// Mutable variant of [`FixedStructArray::element_bytes`].
    pub fn element_bytes_mut(&mut self, element: usize) -> &mut [u8] {
        let stride = self.stride_bytes();
        assert!(element < self.capacity(), "element {element} out of bounds");
        &mut self.block.bytes_mut()[element * stride..(element + 1) * stride]
    }

    /// Read one lane of one field for one element.
    ///
    /// # Panics
    ///
    /// Panics on a bad element/field/lane index or element-type mismatch.
    pub fn read<T: Scalar>(&self, element: usize, field: usize, lane: u32) -> T {
        let offset = self.lane_offset::<T>(element, field, lane);
        pod_read_unaligned(&self.block.bytes()[offset..offset + std::mem::size_of::<T>()])
    }

    /// Write one lane of one field for one element.
    pub fn write<T: Scalar>(&mut self, element: usize, field: usize, lane: u32, value: T) {
        let offset = self.lane_offset::<T>(element, field, lane);
        self.block.bytes_mut()[offset..offset + std::mem::size_of::<T>()]
            .copy_from_slice(bytes_of(&value));
    }

    fn lane_offset<T: Scalar>(&self, element: usize, field: usize, lane: u32) -> usize {
        assert!(element < self.capacity(), "element {element} out of bounds");
        let slot = self.layout.slot(field);
        assert_eq!(
            slot.kind.view_kind(),
            T::KIND,
            "field '{}' stores {}, access requested {}",
            self.fields[field].name,
            slot.kind,
            T::KIND
        );
        assert!(
            lane < slot.components,
            "lane {lane} out of bounds for field '{}' with {} components",
            self.fields[field].name,
            slot.components
        );
        let stride = self.stride_bytes();
        element * stride + slot.offset + lane as usize * slot.kind.size_bytes()
    }

    /// Look up a field's index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Zero the whole buffer.
    pub fn fill_zero(&mut self) {
        self.block.zero_all();
    }

    /// Bytes per interleaved element.
    pub fn stride_bytes(&self) -> usize {
        // AoS layouts always carry a stride.
        self.layout.stride_bytes().unwrap_or(0)
    }

    /// Fixed element capacity.
    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The layout descriptor (field offsets within the stride).
    pub fn layout(&self) -> &StructLayout {
        &self.layout
    }

    /// Memory footprint in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.block.memory_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marrow_core::ScalarKind;

    fn vertex_fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("position", ScalarKind::F32, 3),
            FieldDef::new("color", ScalarKind::U8, 4),
        ]
    }

    #[test]
    fn multi_array_capacity_is_exact() {
        let arr = FixedMultiArray::new(10, vertex_fields()).unwrap();
        assert_eq!(arr.capacity(), 10);
        assert!(arr.is_owned());
    }

    #[test]
    fn multi_array_views_are_zeroed_and_writable() {
        let mut arr = FixedMultiArray::new(6, vertex_fields()).unwrap();
        assert!(arr.field_slice::<f32>(0).iter().all(|&v| v == 0.0));
        arr.field_slice_mut::<u8>(1).fill(0x80);
        assert!(arr.field_slice::<u8>(1).iter().all(|&v| v == 0x80));
        // The f32 block is untouched.
        assert!(arr.field_slice::<f32>(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn multi_array_from_words_preserves_contents() {
        let fields = vec![FieldDef::new("data", ScalarKind::U8, 1)];
        let words = vec![0x0101_0101_0101_0101u64; 2];
        let arr = FixedMultiArray::from_words(16, fields, words).unwrap();
        assert!(!arr.is_owned());
        assert!(arr.field_slice::<u8>(0).iter().all(|&v| v == 1));
    }

    #[test]
    fn multi_array_from_words_rejects_short_buffer() {
        let fields = vec![FieldDef::new("data", ScalarKind::F64, 1)];
        let result = FixedMultiArray::from_words(16, fields, vec![0u64; 4]);
        assert!(matches!(
            result,
            Err(StorageError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn struct_array_interleaves_at_stride() {
        let arr = FixedStructArray::new(10, vertex_fields()).unwrap();
        assert_eq!(arr.stride_bytes(), 16); // 12 f32 + 4 u8
        assert_eq!(arr.element_bytes(3).len(), 16);
    }

    #[test]
    fn struct_array_lane_round_trip() {
        let mut arr = FixedStructArray::new(4, vertex_fields()).unwrap();
        arr.write::<f32>(2, 0, 1, -5.5);
        arr.write::<u8>(2, 1, 3, 0xFF);
        assert_eq!(arr.read::<f32>(2, 0, 1), -5.5);
        assert_eq!(arr.read::<u8>(2, 1, 3), 0xFF);
        // Neighbouring element untouched.
        assert_eq!(arr.read::<f32>(3, 0, 1), 0.0);
        assert_eq!(arr.read::<u8>(1, 1, 3), 0);
    }

    #[test]
    fn struct_array_fill_zero_clears_lanes() {
        let mut arr = FixedStructArray::new(4, vertex_fields()).unwrap();
        arr.write::<f32>(0, 0, 0, 1.0);
        arr.fill_zero();
        assert_eq!(arr.read::<f32>(0, 0, 0), 0.0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn struct_array_element_bounds_are_checked() {
        let arr = FixedStructArray::new(4, vertex_fields()).unwrap();
        let _ = arr.element_bytes(4);
    }

    #[test]
    #[should_panic(expected = "lane 3 out of bounds")]
    fn struct_array_lane_bounds_are_checked() {
        let arr = FixedStructArray::new(4, vertex_fields()).unwrap();
        let _ = arr.read::<f32>(0, 0, 3);
    }

    #[test]
    #[should_panic(expected = "access requested")]
    fn struct_array_type_mismatch_panics() {
        let arr = FixedStructArray::new(4, vertex_fields()).unwrap();
        let _ = arr.read::<u32>(0, 0, 0);
    }
}
