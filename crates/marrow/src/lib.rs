//! Marrow: structured arena storage for engine component managers.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Marrow sub-crates. For most users, adding `marrow` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use marrow::prelude::*;
//!
//! // A component manager pairs a handle registry with an arena.
//! struct RigidBody;
//! impl InstanceKind for RigidBody {}
//!
//! let mut registry = InstanceRegistry::<RigidBody>::new();
//! let mut storage = StructuredArray::new(
//!     64,
//!     vec![
//!         FieldDef::new("position", ScalarKind::F32, 3),
//!         FieldDef::new("mass", ScalarKind::F32, 1),
//!     ],
//! )
//! .unwrap();
//!
//! // Mint a handle and store its component data.
//! let body = registry.create().unwrap();
//! let (slot, _realloc) = storage.push().unwrap();
//! storage.field_slice_mut::<f32>(1)[slot] = 12.5;
//!
//! assert!(registry.alive(body));
//! assert_eq!(storage.field_slice::<f32>(1)[slot], 12.5);
//!
//! // Destroying the instance leaves the old handle detectably stale.
//! registry.destroy(body);
//! assert!(!registry.alive(body));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `marrow-core` | Scalar kinds, field defs, alignment & sizing |
//! | [`arena`] | `marrow-arena` | Storage blocks, layouts, structured arrays |
//! | [`instance`] | `marrow-instance` | Generational handles and registries |
//! | [`geometry`] | `marrow-geometry` | Packed vertex/index buffer allocation |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Scalar kinds, field definitions, and sizing arithmetic (`marrow-core`).
pub use marrow_core as types;

/// Storage blocks, structured layouts, and arenas (`marrow-arena`).
///
/// The main entry point is [`arena::StructuredArray`]; fixed-capacity
/// variants live alongside it.
pub use marrow_arena as arena;

/// Generational instance handles and slot registries (`marrow-instance`).
pub use marrow_instance as instance;

/// Packed geometry buffer allocation (`marrow-geometry`).
///
/// [`geometry::GeometryBuffers`] slices one allocation into disjoint,
/// aligned vertex and index sub-buffers.
pub use marrow_geometry as geometry;

/// Common imports for typical Marrow usage.
///
/// ```rust
/// use marrow::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use marrow_core::{
        FieldDef, Scalar, ScalarKind, StorageDims, StorageError, StorageFlags,
    };

    // Arena storage
    pub use marrow_arena::{
        FixedMultiArray, FixedStructArray, Realloc, StructLayout, StructuredArray, Topology,
    };

    // Instance handles
    pub use marrow_instance::{
        Handle, InstanceError, InstanceKind, InstanceRegistry, RegistryConfig,
    };

    // Geometry allocation
    pub use marrow_geometry::{
        GeometryBuffers, GeometryError, GeometryLayout, IndexSlice, IndexSliceMut, IndexWidth,
        VertexStreamLayout,
    };
}
