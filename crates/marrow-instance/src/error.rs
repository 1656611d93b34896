//! Instance registry error types.

use std::error::Error;
use std::fmt;

use crate::handle::MAX_INDEX;

/// Errors from instance handle allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstanceError {
    /// Every addressable slot index is issued and the free list has not
    /// reached the reuse threshold.
    IndexSpaceExhausted,
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexSpaceExhausted => {
                write!(f, "instance index space exhausted ({MAX_INDEX} slots)")
            }
        }
    }
}

impl Error for InstanceError {}
