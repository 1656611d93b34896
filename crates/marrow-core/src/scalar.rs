//! The fixed table of scalar element kinds and the [`Scalar`] view trait.
//!
//! A [`ScalarKind`] describes one numeric element kind: its byte size,
//! value range, and signedness. The table is process-wide configuration
//! data — one constant entry per supported kind, never extended at
//! runtime.

use std::fmt;

/// One numeric element kind a field can store.
///
/// `U8Clamped` stores identically to `U8`; the clamped variant exists so
/// callers writing image-style data can declare saturating write intent.
/// Both materialize views as `u8` (see [`ScalarKind::view_kind`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 8-bit integer with saturating write convention.
    U8Clamped,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// 32-bit IEEE 754 float.
    F32,
    /// 64-bit IEEE 754 float.
    F64,
}

impl ScalarKind {
    /// Every supported kind, in declaration order.
    pub const ALL: [ScalarKind; 9] = [
        Self::U8,
        Self::U8Clamped,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::U32,
        Self::I32,
        Self::F32,
        Self::F64,
    ];

    /// Size of one element of this kind in bytes.
    ///
    /// Also the natural alignment of the kind: every supported kind is a
    /// power-of-two-sized primitive.
    pub fn size_bytes(self) -> usize {
        match self {
            Self::U8 | Self::U8Clamped | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Smallest representable value, widened to f64.
    pub fn min(self) -> f64 {
        match self {
            Self::U8 | Self::U8Clamped | Self::U16 | Self::U32 => 0.0,
            Self::I8 => f64::from(i8::MIN),
            Self::I16 => f64::from(i16::MIN),
            Self::I32 => f64::from(i32::MIN),
            Self::F32 => f64::from(f32::MIN),
            Self::F64 => f64::MIN,
        }
    }

    /// Largest representable value, widened to f64.
    pub fn max(self) -> f64 {
        match self {
            Self::U8 | Self::U8Clamped => f64::from(u8::MAX),
            Self::I8 => f64::from(i8::MAX),
            Self::U16 => f64::from(u16::MAX),
            Self::I16 => f64::from(i16::MAX),
            Self::U32 => f64::from(u32::MAX),
            Self::I32 => f64::from(i32::MAX),
            Self::F32 => f64::from(f32::MAX),
            Self::F64 => f64::MAX,
        }
    }

    /// Whether the kind can represent negative values.
    pub fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::F32 | Self::F64)
    }

    /// Whether the kind is a floating-point kind.
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// The kind used for typed views over this kind's storage.
    ///
    /// Identity for every kind except `U8Clamped`, which views as `U8` —
    /// clamping is a write policy, not a storage representation.
    pub fn view_kind(self) -> ScalarKind {
        match self {
            Self::U8Clamped => Self::U8,
            other => other,
        }
    }

    /// Short lowercase name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U8Clamped => "u8c",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for i8 {}
    impl Sealed for u16 {}
    impl Sealed for i16 {}
    impl Sealed for u32 {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Rust element types that can back a typed field view.
///
/// Sealed: exactly the eight primitive element types in the
/// [`ScalarKind`] table implement it. The `Pod` bound is what lets the
/// storage crates reinterpret byte buffers as `&[T]` without `unsafe`.
pub trait Scalar: sealed::Sealed + bytemuck::Pod {
    /// The kind a view of this element type matches
    /// (compared against [`ScalarKind::view_kind`]).
    const KIND: ScalarKind;
}

impl Scalar for u8 {
    const KIND: ScalarKind = ScalarKind::U8;
}
impl Scalar for i8 {
    const KIND: ScalarKind = ScalarKind::I8;
}
impl Scalar for u16 {
    const KIND: ScalarKind = ScalarKind::U16;
}
impl Scalar for i16 {
    const KIND: ScalarKind = ScalarKind::I16;
}
impl Scalar for u32 {
    const KIND: ScalarKind = ScalarKind::U32;
}
impl Scalar for i32 {
    const KIND: ScalarKind = ScalarKind::I32;
}
impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::F32;
}
impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::F64;
}
