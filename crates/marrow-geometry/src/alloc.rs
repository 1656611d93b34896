//! The geometry buffer allocator.

use std::ops::Range;

use bytemuck::{cast_slice, cast_slice_mut};
use marrow_arena::StorageBlock;
use marrow_core::{align_down, StorageFlags};
use smallvec::SmallVec;

use crate::error::GeometryError;
use crate::layout::{GeometryLayout, IndexWidth, SUB_BUFFER_ALIGN};

/// One vertex stream's slice of the allocation.
#[derive(Clone, Debug)]
struct StreamSlice {
    range: Range<usize>,
    stride_bytes: usize,
}

/// A typed, read-only view of an index sub-buffer.
#[derive(Debug)]
pub enum IndexSlice<'a> {
    /// 16-bit indices.
    U16(&'a [u16]),
    /// 32-bit indices.
    U32(&'a [u32]),
}

impl IndexSlice<'_> {
    /// Number of indices.
    pub fn len(&self) -> usize {
        match self {
            Self::U16(s) => s.len(),
            Self::U32(s) => s.len(),
        }
    }

    /// Whether there are no indices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The index at `i`, widened to u32.
    pub fn get(&self, i: usize) -> u32 {
        match self {
            Self::U16(s) => u32::from(s[i]),
            Self::U32(s) => s[i],
        }
    }
}

/// A typed, mutable view of an index sub-buffer.
#[derive(Debug)]
pub enum IndexSliceMut<'a> {
    /// 16-bit indices.
    U16(&'a mut [u16]),
    /// 32-bit indices.
    U32(&'a mut [u32]),
}

impl IndexSliceMut<'_> {
    /// Store `value` at `i`.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not fit the element width — the width was
    /// chosen to address every vertex, so an overflowing value is a
    /// programmer error.
    pub fn set(&mut self, i: usize, value: u32) {
        match self {
            Self::U16(s) => {
                s[i] = u16::try_from(value).expect("index exceeds 16-bit element width");
            }
            Self::U32(s) => s[i] = value,
        }
    }
}

/// One geometry's packed vertex and index storage.
///
/// A single contiguous allocation sliced into one sub-buffer per vertex
/// stream plus an optional index sub-buffer. Sub-buffer ranges are
/// pairwise disjoint and each starts at a [`SUB_BUFFER_ALIGN`] boundary
/// by construction. Vertex and index counts are fixed at allocation.
#[derive(Clone, Debug)]
pub struct GeometryBuffers {
    block: StorageBlock,
    streams: SmallVec<[StreamSlice; 4]>,
    index: Option<(Range<usize>, IndexWidth)>,
    vertex_count: usize,
    index_count: usize,
}

impl GeometryBuffers {
    /// Allocate packed storage for `vertex_count` vertices across every
    /// stream in `layout`, plus `index_count` indices if non-zero.
    ///
    /// The index element width is the minimum able to address
    /// `vertex_count` vertices.
    pub fn allocate(
        layout: &GeometryLayout,
        vertex_count: usize,
        index_count: usize,
    ) -> Result<GeometryBuffers, GeometryError> {
        if vertex_count == 0 {
            return Err(GeometryError::NoVertices);
        }
        if layout.is_empty() {
            return Err(GeometryError::EmptyLayout);
        }

        let mut cursor = 0usize;
        let mut streams = SmallVec::with_capacity(layout.stream_count());
        for (i, stream) in layout.streams().iter().enumerate() {
            if stream.stride_bytes == 0 {
                return Err(GeometryError::ZeroStride { stream: i });
            }
            let bytes = stream
                .stride_bytes
                .checked_mul(vertex_count)
                .ok_or_else(|| too_large(stream.stride_bytes, vertex_count))?;
            let end = cursor
                .checked_add(bytes)
                .ok_or_else(|| too_large(cursor, bytes))?;
            streams.push(StreamSlice {
                range: cursor..end,
                stride_bytes: stream.stride_bytes,
            });
            cursor = checked_align(end)?;
        }

        let index = if index_count > 0 {
            let width = IndexWidth::for_vertex_count(vertex_count);
            let bytes = width
                .size_bytes()
                .checked_mul(index_count)
                .ok_or_else(|| too_large(width.size_bytes(), index_count))?;
            let end = cursor
                .checked_add(bytes)
                .ok_or_else(|| too_large(cursor, bytes))?;
            let range = cursor..end;
            cursor = checked_align(end)?;
            Some((range, width))
        } else {
            None
        };

        let block = StorageBlock::allocate(1, cursor, StorageFlags::NONE)?;
        Ok(GeometryBuffers {
            block,
            streams,
            index,
            vertex_count,
            index_count,
        })
    }

    /// Byte view of one vertex stream's sub-buffer.
    ///
    /// # Panics
    ///
    /// Panics if `stream` is out of bounds.
    pub fn stream_bytes(&self, stream: usize) -> &[u8] {
        &self.block.bytes()[self.streams[stream].range.clone()]
    }

    /// Mutable byte view of one vertex stream's sub-buffer.
    pub fn stream_bytes_mut(&mut self, stream: usize) -> &mut [u8] {
        let range = self.streams[stream].range.clone();
        &mut self.block.bytes_mut()[range]
    }

    /// The byte range of one vertex stream within the allocation.
    pub fn stream_range(&self, stream: usize) -> Range<usize> {
        self.streams[stream].range.clone()
    }

    /// Bytes per vertex in one stream.
    pub fn stream_stride(&self, stream: usize) -> usize {
        self.streams[stream].stride_bytes
    }

    /// Number of vertex streams.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Byte view of the index sub-buffer, if indices were allocated.
    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.index
            .as_ref()
            .map(|(range, _)| &self.block.bytes()[range.clone()])
    }

    /// Mutable byte view of the index sub-buffer, if indices were allocated.
    pub fn index_bytes_mut(&mut self) -> Option<&mut [u8]> {
        let range = self.index.as_ref().map(|(range, _)| range.clone())?;
        Some(&mut self.block.bytes_mut()[range])
    }

    /// The byte range of the index sub-buffer within the allocation.
    pub fn index_range(&self) -> Option<Range<usize>> {
        self.index.as_ref().map(|(range, _)| range.clone())
    }

    /// The chosen index element width, if indices were allocated.
    pub fn index_width(&self) -> Option<IndexWidth> {
        self.index.as_ref().map(|&(_, width)| width)
    }

    /// Typed view of the indices.
    pub fn indices(&self) -> Option<IndexSlice<'_>> {
        let (range, width) = self.index.as_ref()?;
        let bytes = &self.block.bytes()[range.clone()];
        Some(match width {
            IndexWidth::U16 => IndexSlice::U16(cast_slice(bytes)),
            IndexWidth::U32 => IndexSlice::U32(cast_slice(bytes)),
        })
    }

    /// Mutable typed view of the indices.
    pub fn indices_mut(&mut self) -> Option<IndexSliceMut<'_>> {
        let (range, width) = self.index.clone()?;
        let bytes = &mut self.block.bytes_mut()[range];
        Some(match width {
            IndexWidth::U16 => IndexSliceMut::U16(cast_slice_mut(bytes)),
            IndexWidth::U32 => IndexSliceMut::U32(cast_slice_mut(bytes)),
        })
    }

    /// Number of vertices the allocation holds per stream.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of indices the allocation holds (0 for non-indexed).
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Usable packed size in bytes.
    pub fn total_bytes(&self) -> usize {
        self.block.size_bytes()
    }

    /// Memory footprint of the backing allocation in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.block.memory_bytes()
    }
}

fn too_large(a: usize, b: usize) -> GeometryError {
    GeometryError::AllocationTooLarge {
        requested_bytes: a as u128 * b as u128,
    }
}

fn checked_align(value: usize) -> Result<usize, GeometryError> {
    value
        .checked_add(SUB_BUFFER_ALIGN - 1)
        .map(|v| align_down(v, SUB_BUFFER_ALIGN))
        .ok_or(GeometryError::AllocationTooLarge {
            requested_bytes: value as u128 + SUB_BUFFER_ALIGN as u128,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::VertexStreamLayout;

    fn two_stream_layout() -> GeometryLayout {
        GeometryLayout::new()
            .with_stream(VertexStreamLayout::new(12))
            .with_stream(VertexStreamLayout::new(8))
    }

    fn ranges_overlap(a: &Range<usize>, b: &Range<usize>) -> bool {
        a.start < b.end && b.start < a.end
    }

    #[test]
    fn sub_buffers_are_disjoint_and_aligned() {
        let buffers = GeometryBuffers::allocate(&two_stream_layout(), 100, 300).unwrap();

        let mut ranges = vec![buffers.stream_range(0), buffers.stream_range(1)];
        ranges.push(buffers.index_range().unwrap());

        for range in &ranges {
            assert_eq!(range.start % SUB_BUFFER_ALIGN, 0, "{range:?}");
            assert!(!range.is_empty());
        }
        for i in 0..ranges.len() {
            for j in i + 1..ranges.len() {
                assert!(
                    !ranges_overlap(&ranges[i], &ranges[j]),
                    "{:?} overlaps {:?}",
                    ranges[i],
                    ranges[j]
                );
            }
        }
    }

    #[test]
    fn packed_sizes_match_the_running_total() {
        let buffers = GeometryBuffers::allocate(&two_stream_layout(), 100, 300).unwrap();
        assert_eq!(buffers.stream_range(0), 0..1200);
        assert_eq!(buffers.stream_range(1), 1200..2000);
        // 100 vertices fit u16 indices: 300 * 2 bytes.
        assert_eq!(buffers.index_range(), Some(2000..2600));
        assert_eq!(buffers.total_bytes(), 2600);
    }

    #[test]
    fn small_meshes_select_u16_indices() {
        let layout = GeometryLayout::new().with_stream(VertexStreamLayout::new(12));
        let buffers = GeometryBuffers::allocate(&layout, 60000, 10).unwrap();
        assert_eq!(buffers.index_width(), Some(IndexWidth::U16));
    }

    #[test]
    fn large_meshes_select_u32_indices() {
        let layout = GeometryLayout::new().with_stream(VertexStreamLayout::new(12));
        let buffers = GeometryBuffers::allocate(&layout, 70000, 10).unwrap();
        assert_eq!(buffers.index_width(), Some(IndexWidth::U32));
    }

    #[test]
    fn non_indexed_allocation_has_no_index_buffer() {
        let buffers = GeometryBuffers::allocate(&two_stream_layout(), 10, 0).unwrap();
        assert!(buffers.index_bytes().is_none());
        assert!(buffers.indices().is_none());
        assert_eq!(buffers.index_count(), 0);
    }

    #[test]
    fn stream_writes_do_not_bleed() {
        let mut buffers = GeometryBuffers::allocate(&two_stream_layout(), 16, 24).unwrap();
        buffers.stream_bytes_mut(0).fill(0xAA);
        buffers.stream_bytes_mut(1).fill(0xBB);
        if let Some(IndexSliceMut::U16(indices)) = buffers.indices_mut() {
            indices.fill(0x0C0C);
        } else {
            panic!("expected u16 indices");
        }

        assert!(buffers.stream_bytes(0).iter().all(|&b| b == 0xAA));
        assert!(buffers.stream_bytes(1).iter().all(|&b| b == 0xBB));
        if let Some(IndexSlice::U16(indices)) = buffers.indices() {
            assert!(indices.iter().all(|&v| v == 0x0C0C));
        } else {
            panic!("expected u16 indices");
        }
    }

    #[test]
    fn raw_index_bytes_mirror_the_typed_view() {
        let layout = GeometryLayout::new().with_stream(VertexStreamLayout::new(4));
        let mut buffers = GeometryBuffers::allocate(&layout, 100, 4).unwrap();

        // Little-endian u16 writes through the raw mutable view...
        buffers
            .index_bytes_mut()
            .unwrap()
            .copy_from_slice(&[1, 0, 2, 0, 3, 0, 4, 0]);

        // ...read back through the typed view, and vice versa.
        let indices = buffers.indices().unwrap();
        assert_eq!(indices.get(0), 1);
        assert_eq!(indices.get(3), 4);
        assert_eq!(buffers.index_bytes().unwrap().len(), 8);
    }

    #[test]
    fn index_views_round_trip_values() {
        let layout = GeometryLayout::new().with_stream(VertexStreamLayout::new(4));
        let mut buffers = GeometryBuffers::allocate(&layout, 100, 6).unwrap();
        {
            let mut indices = buffers.indices_mut().unwrap();
            for (i, v) in [0u32, 1, 2, 2, 1, 3].into_iter().enumerate() {
                indices.set(i, v);
            }
        }
        let indices = buffers.indices().unwrap();
        assert_eq!(indices.len(), 6);
        assert_eq!(indices.get(0), 0);
        assert_eq!(indices.get(3), 2);
        assert_eq!(indices.get(5), 3);
    }

    #[test]
    fn zero_vertices_is_rejected() {
        let result = GeometryBuffers::allocate(&two_stream_layout(), 0, 10);
        assert_eq!(result.err(), Some(GeometryError::NoVertices));
    }

    #[test]
    fn empty_layout_is_rejected() {
        let result = GeometryBuffers::allocate(&GeometryLayout::new(), 10, 10);
        assert_eq!(result.err(), Some(GeometryError::EmptyLayout));
    }

    #[test]
    fn zero_stride_is_rejected() {
        let layout = GeometryLayout::new()
            .with_stream(VertexStreamLayout::new(12))
            .with_stream(VertexStreamLayout::new(0));
        let result = GeometryBuffers::allocate(&layout, 10, 0);
        assert_eq!(result.err(), Some(GeometryError::ZeroStride { stream: 1 }));
    }

    #[test]
    fn overflow_is_an_explicit_error() {
        let layout = GeometryLayout::new().with_stream(VertexStreamLayout::new(usize::MAX));
        let result = GeometryBuffers::allocate(&layout, 2, 0);
        assert!(matches!(
            result,
            Err(GeometryError::AllocationTooLarge { .. })
        ));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use crate::layout::VertexStreamLayout;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn all_sub_buffers_disjoint_and_aligned(
                strides in prop::collection::vec(1usize..64, 1..6),
                vertex_count in 1usize..5000,
                index_count in 0usize..5000,
            ) {
                let layout: GeometryLayout = strides
                    .iter()
                    .map(|&s| VertexStreamLayout::new(s))
                    .collect();
                let buffers =
                    GeometryBuffers::allocate(&layout, vertex_count, index_count).unwrap();

                let mut ranges: Vec<_> =
                    (0..buffers.stream_count()).map(|i| buffers.stream_range(i)).collect();
                if let Some(range) = buffers.index_range() {
                    ranges.push(range);
                }

                for (i, range) in ranges.iter().enumerate() {
                    prop_assert_eq!(range.start % SUB_BUFFER_ALIGN, 0);
                    prop_assert!(range.end <= buffers.total_bytes());
                    for other in &ranges[i + 1..] {
                        prop_assert!(range.end <= other.start || other.end <= range.start);
                    }
                }

                prop_assert_eq!(
                    buffers.stream_bytes(0).len(),
                    strides[0] * vertex_count
                );
            }
        }
    }
}
