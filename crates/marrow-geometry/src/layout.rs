//! Vertex stream and index layout descriptors.

use std::fmt;

use marrow_arena::{StructLayout, Topology};
use marrow_core::{FieldDef, StorageError};
use smallvec::SmallVec;

/// Byte boundary every sub-buffer within a geometry allocation starts on.
///
/// 8 bytes covers the natural alignment of every supported scalar kind,
/// so typed views into any sub-buffer stay valid.
pub const SUB_BUFFER_ALIGN: usize = 8;

/// Element width of an index sub-buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexWidth {
    /// 16-bit indices; sufficient while every vertex is addressable in a u16.
    U16,
    /// 32-bit indices.
    U32,
}

impl IndexWidth {
    /// The minimum width able to address `vertex_count` distinct vertices.
    ///
    /// Indices range over `0..vertex_count`, so 16 bits suffice up to and
    /// including 65536 vertices.
    pub fn for_vertex_count(vertex_count: usize) -> IndexWidth {
        if vertex_count <= 65536 {
            IndexWidth::U16
        } else {
            IndexWidth::U32
        }
    }

    /// Bytes per index element.
    pub fn size_bytes(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

impl fmt::Display for IndexWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U16 => f.write_str("u16"),
            Self::U32 => f.write_str("u32"),
        }
    }
}

/// Layout of one vertex stream: the interleaved byte stride per vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexStreamLayout {
    /// Bytes per vertex in this stream.
    pub stride_bytes: usize,
}

impl VertexStreamLayout {
    /// A stream with an explicit stride.
    pub fn new(stride_bytes: usize) -> VertexStreamLayout {
        VertexStreamLayout { stride_bytes }
    }

    /// Derive a stream layout from an interleaved field list.
    ///
    /// The stride is the array-of-structs stride of the fields — padded
    /// so every attribute sits at its natural alignment.
    pub fn from_fields(fields: &[FieldDef]) -> Result<VertexStreamLayout, StorageError> {
        let layout = StructLayout::compute(fields, Topology::ArrayOfStructs, 1)?;
        Ok(VertexStreamLayout {
            // AoS layouts always carry a stride.
            stride_bytes: layout.stride_bytes().unwrap_or(0),
        })
    }
}

/// Ordered set of vertex stream layouts for one geometry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeometryLayout {
    streams: SmallVec<[VertexStreamLayout; 4]>,
}

impl GeometryLayout {
    /// An empty layout; add streams with [`GeometryLayout::with_stream`].
    pub fn new() -> GeometryLayout {
        GeometryLayout {
            streams: SmallVec::new(),
        }
    }

    /// Append a vertex stream (builder style).
    #[must_use]
    pub fn with_stream(mut self, stream: VertexStreamLayout) -> GeometryLayout {
        self.streams.push(stream);
        self
    }

    /// The streams in declaration order.
    pub fn streams(&self) -> &[VertexStreamLayout] {
        &self.streams
    }

    /// Number of vertex streams.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Whether the layout has no streams.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl FromIterator<VertexStreamLayout> for GeometryLayout {
    fn from_iter<I: IntoIterator<Item = VertexStreamLayout>>(iter: I) -> GeometryLayout {
        GeometryLayout {
            streams: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marrow_core::ScalarKind;

    #[test]
    fn width_selection_boundaries() {
        assert_eq!(IndexWidth::for_vertex_count(1), IndexWidth::U16);
        assert_eq!(IndexWidth::for_vertex_count(60000), IndexWidth::U16);
        assert_eq!(IndexWidth::for_vertex_count(65536), IndexWidth::U16);
        assert_eq!(IndexWidth::for_vertex_count(65537), IndexWidth::U32);
        assert_eq!(IndexWidth::for_vertex_count(70000), IndexWidth::U32);
    }

    #[test]
    fn width_sizes() {
        assert_eq!(IndexWidth::U16.size_bytes(), 2);
        assert_eq!(IndexWidth::U32.size_bytes(), 4);
    }

    #[test]
    fn stream_from_fields_uses_aos_stride() {
        let stream = VertexStreamLayout::from_fields(&[
            FieldDef::new("position", ScalarKind::F32, 3),
            FieldDef::new("color", ScalarKind::U8, 4),
        ])
        .unwrap();
        assert_eq!(stream.stride_bytes, 16);
    }

    #[test]
    fn layout_collects_streams_in_order() {
        let layout = GeometryLayout::new()
            .with_stream(VertexStreamLayout::new(12))
            .with_stream(VertexStreamLayout::new(8));
        assert_eq!(layout.stream_count(), 2);
        assert_eq!(layout.streams()[0].stride_bytes, 12);
        assert_eq!(layout.streams()[1].stride_bytes, 8);
    }
}
