//! Geometry allocation error types.

use std::error::Error;
use std::fmt;

use marrow_core::StorageError;

/// Errors from geometry buffer allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GeometryError {
    /// `vertex_count` was zero — there is nothing to allocate.
    NoVertices,
    /// The geometry layout declares no vertex streams.
    EmptyLayout,
    /// A vertex stream declares a zero stride.
    ZeroStride {
        /// Index of the offending stream.
        stream: usize,
    },
    /// The packed total byte size overflows the address space.
    AllocationTooLarge {
        /// Number of bytes the allocation would have needed.
        requested_bytes: u128,
    },
    /// The underlying storage layer rejected the allocation.
    Storage(StorageError),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVertices => write!(f, "geometry allocation requires at least one vertex"),
            Self::EmptyLayout => write!(f, "geometry layout has no vertex streams"),
            Self::ZeroStride { stream } => {
                write!(f, "vertex stream {stream} has a zero byte stride")
            }
            Self::AllocationTooLarge { requested_bytes } => {
                write!(
                    f,
                    "geometry allocation too large: {requested_bytes} bytes requested"
                )
            }
            Self::Storage(err) => write!(f, "geometry storage allocation failed: {err}"),
        }
    }
}

impl Error for GeometryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for GeometryError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}
