//! Structured arena storage: many typed fields, one contiguous buffer.
//!
//! The central type is [`StructuredArray`] — a grow-capable arena that
//! lays out a fixed set of typed fields inside a single word-aligned
//! byte buffer and hands out typed slices per field. Component managers
//! (transforms, rigid bodies, colliders, ...) each own one and get
//! cache-friendly bulk storage with no per-instance allocation.
//!
//! # Architecture
//!
//! ```text
//! StructuredArray (growable arena)
//! ├── StorageBlock      — word-backed zeroed buffer, sized by StorageDims
//! ├── StructLayout      — pure field → (offset, elem size) computation
//! └── IndexMap<name, i> — deterministic by-name field lookup
//!
//! FixedMultiArray / FixedStructArray — never-grow specializations
//! ```
//!
//! # View invalidation
//!
//! Field views borrow the array, so any capacity-changing call
//! (`reserve`, `resize`, `push`) structurally invalidates outstanding
//! views at compile time. The [`Realloc`] return value is still
//! reported for callers that mirror the buffer somewhere the borrow
//! checker cannot see (GPU copies, recorded upload ranges).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod block;
pub mod fixed;
pub mod layout;

pub use array::{Realloc, StructuredArray};
pub use block::StorageBlock;
pub use fixed::{FixedMultiArray, FixedStructArray};
pub use layout::{FieldSlot, StructLayout, Topology};
