//! Region reservation errors.

use std::error::Error;
use std::fmt;

/// Errors that can occur while reserving a backing region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionError {
    /// A region of zero bytes was requested.
    InvalidCapacity,
    /// The host could not satisfy the reservation.
    OutOfMemory {
        /// Number of bytes requested from the host.
        requested: usize,
    },
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity => write!(f, "region capacity must be non-zero"),
            Self::OutOfMemory { requested } => {
                write!(f, "host could not reserve {requested} bytes")
            }
        }
    }
}

impl Error for RegionError {}
