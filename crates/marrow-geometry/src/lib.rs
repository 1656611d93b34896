//! Geometry buffer allocation: one allocation, many sub-buffers.
//!
//! Mesh construction wants N vertex streams plus an optional index
//! stream in a single contiguous allocation, each sub-buffer starting on
//! an 8-byte boundary so typed views into it stay aligned.
//! [`GeometryBuffers::allocate`] computes the packed total, makes one
//! word-backed allocation, and slices it into pairwise disjoint ranges.
//!
//! The index element width is chosen automatically: 16-bit while
//! `vertex_count` fits, 32-bit beyond.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod alloc;
pub mod error;
pub mod layout;

pub use alloc::{GeometryBuffers, IndexSlice, IndexSliceMut};
pub use error::GeometryError;
pub use layout::{GeometryLayout, IndexWidth, VertexStreamLayout, SUB_BUFFER_ALIGN};
