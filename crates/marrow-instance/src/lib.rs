//! Generational instance handles and slot registries.
//!
//! A [`Handle`] packs a dense slot index and a per-slot generation
//! counter into one 32-bit word; an [`InstanceRegistry`] mints handles,
//! validates them in O(1), and recycles destroyed slots through a FIFO
//! free list with a configurable buildup threshold that defers reuse.
//!
//! Handles are phantom-typed by an [`InstanceKind`] marker, so a handle
//! minted by one manager cannot be passed to another even though the
//! packed encodings may collide numerically.
//!
//! # Bit layout
//!
//! 24 index bits + 8 generation bits in a `u32`. Raw value 0 (index 0,
//! generation 0) is the reserved null sentinel, so a registry can
//! address at most 2^24 − 1 live instances, and a slot's generation
//! wraps after 256 destroy cycles. The FIFO discipline plus the buildup
//! threshold bound — but cannot eliminate — the chance of a very old
//! handle observing a matching generation after wrap-around.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handle;
pub mod registry;

pub use error::InstanceError;
pub use handle::{Handle, InstanceKind, GENERATION_BITS, INDEX_BITS, MAX_INDEX};
pub use registry::{InstanceRegistry, RegistryConfig};
