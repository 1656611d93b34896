//! Shared fixtures for Marrow benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use marrow_core::{FieldDef, ScalarKind};

/// Field set shaped like a rigid-body component manager.
pub fn rigid_body_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("position", ScalarKind::F32, 3),
        FieldDef::new("rotation", ScalarKind::F32, 4),
        FieldDef::new("linear_velocity", ScalarKind::F32, 3),
        FieldDef::new("angular_velocity", ScalarKind::F32, 3),
        FieldDef::new("mass", ScalarKind::F32, 1),
        FieldDef::new("flags", ScalarKind::U8, 1),
    ]
}

/// Field set shaped like an interleaved static-mesh vertex.
pub fn mesh_vertex_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("position", ScalarKind::F32, 3),
        FieldDef::new("normal", ScalarKind::F32, 3),
        FieldDef::new("uv", ScalarKind::F32, 2),
        FieldDef::new("color", ScalarKind::U8, 4),
    ]
}
