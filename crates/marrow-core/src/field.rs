//! Field definitions: one named, typed channel of per-element data.

use std::fmt;

use crate::error::StorageError;
use crate::scalar::ScalarKind;

/// Definition of one field in a structured collection.
///
/// A field is `components` consecutive elements of `kind` per logical
/// slot — `"position"` as 3 × f32, `"flags"` as 1 × u8. Field order is
/// significant: layouts assign offsets in declaration order, so the same
/// field list always produces the same layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    /// Human-readable name, used for by-name lookup and diagnostics.
    pub name: String,
    /// Element kind of the field's components.
    pub kind: ScalarKind,
    /// Number of elements per slot. Must be at least 1.
    pub components: u32,
}

impl FieldDef {
    /// Create a field definition.
    ///
    /// `components` of 0 is rejected by layout computation, not here;
    /// the struct stays plain data and literal construction is equally
    /// valid.
    pub fn new(name: impl Into<String>, kind: ScalarKind, components: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            components,
        }
    }

    /// Bytes occupied by one slot's worth of this field.
    ///
    /// Returns `AllocationTooLarge` if `components * size_bytes` exceeds
    /// the address space — only reachable with absurd component counts,
    /// but the arithmetic stays checked all the way down.
    pub fn elem_size_bytes(&self) -> Result<usize, StorageError> {
        (self.components as usize)
            .checked_mul(self.kind.size_bytes())
            .ok_or(StorageError::AllocationTooLarge {
                requested_bytes: u128::from(self.components) * self.kind.size_bytes() as u128,
            })
    }
}

impl fmt::Display for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} x{}", self.name, self.kind, self.components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elem_size_is_components_times_kind_size() {
        let pos = FieldDef::new("position", ScalarKind::F32, 3);
        assert_eq!(pos.elem_size_bytes().unwrap(), 12);

        let flags = FieldDef::new("flags", ScalarKind::U8, 1);
        assert_eq!(flags.elem_size_bytes().unwrap(), 1);

        let transform = FieldDef::new("world", ScalarKind::F64, 16);
        assert_eq!(transform.elem_size_bytes().unwrap(), 128);
    }

    #[test]
    fn display_includes_name_and_kind() {
        let f = FieldDef::new("velocity", ScalarKind::F32, 3);
        assert_eq!(f.to_string(), "velocity: f32 x3");
    }
}
