//! Core primitives for the Marrow structured storage layer.
//!
//! This crate holds the pieces every other Marrow crate builds on:
//!
//! - [`ScalarKind`] and the [`Scalar`] trait — the fixed table of numeric
//!   element kinds a field can store, and the mapping from Rust element
//!   types to those kinds.
//! - [`FieldDef`] — one named, typed channel of per-element data
//!   (e.g. `"position"` = 3 × f32).
//! - Alignment and sizing arithmetic ([`align_up`], [`round_up_pow2`],
//!   [`StorageDims`], [`StorageFlags`]) used to size backing buffers.
//! - [`StorageError`] — the shared error type for sizing and layout
//!   violations.
//!
//! Everything here is pure data and arithmetic; no module in this crate
//! allocates storage.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod align;
pub mod error;
pub mod field;
pub mod scalar;

pub use align::{align_down, align_up, round_up_pow2, StorageDims, StorageFlags};
pub use error::StorageError;
pub use field::FieldDef;
pub use scalar::{Scalar, ScalarKind};
