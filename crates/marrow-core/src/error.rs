//! Shared error types for storage sizing and layout.

use std::error::Error;
use std::fmt;

/// Errors from storage sizing and layout computation.
///
/// All variants are raised synchronously at the violating call. Callers
/// are expected to treat them as construction-time failures: nothing in
/// this family is retryable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// A capacity of zero was requested where at least one slot is needed.
    ZeroCapacity,
    /// An item byte size of zero was supplied to storage sizing.
    ZeroItemSize,
    /// A layout was requested over an empty field list.
    EmptyFieldList,
    /// A field declared zero components.
    ZeroComponents {
        /// Name of the offending field.
        field: String,
    },
    /// The requested capacity or byte size exceeds the representable range.
    AllocationTooLarge {
        /// Number of bytes the request would have needed.
        requested_bytes: u128,
    },
    /// An externally supplied buffer is smaller than the computed requirement.
    BufferTooSmall {
        /// Bytes the storage dimensions require.
        required_bytes: usize,
        /// Bytes the caller actually supplied.
        provided_bytes: usize,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "storage capacity must be at least 1"),
            Self::ZeroItemSize => write!(f, "item size must be at least 1 byte"),
            Self::EmptyFieldList => write!(f, "layout requires at least one field"),
            Self::ZeroComponents { field } => {
                write!(f, "field '{field}' declares zero components")
            }
            Self::AllocationTooLarge { requested_bytes } => {
                write!(f, "allocation too large: {requested_bytes} bytes requested")
            }
            Self::BufferTooSmall {
                required_bytes,
                provided_bytes,
            } => {
                write!(
                    f,
                    "supplied buffer too small: {provided_bytes} bytes provided, \
                     {required_bytes} bytes required"
                )
            }
        }
    }
}

impl Error for StorageError {}
