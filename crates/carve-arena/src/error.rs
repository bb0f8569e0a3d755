//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use carve_region::RegionError;

/// Why a pointer was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerFault {
    /// No block starts at this address. Covers addresses outside the
    /// region and addresses in the middle of a block.
    Foreign,
    /// A block starts here but is currently free. On `deallocate` this is
    /// a double free; on data access it is a use after free.
    Freed,
}

impl fmt::Display for PointerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Foreign => write!(f, "not a block owned by this arena"),
            Self::Freed => write!(f, "block is already free"),
        }
    }
}

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena was configured with zero capacity.
    InvalidCapacity,
    /// A zero-byte allocation was requested.
    InvalidSize,
    /// The host refused to reserve the backing region.
    HostOutOfMemory {
        /// Number of bytes requested from the host.
        requested: usize,
    },
    /// No free block fits and the untouched tail is too small.
    ArenaExhausted {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes left between the high-water mark and the end of the region.
        remaining: usize,
    },
    /// A pointer that does not name a live block of this arena.
    InvalidPointer {
        /// The rejected address.
        address: usize,
        /// What was wrong with it.
        fault: PointerFault,
    },
}

impl ArenaError {
    /// Whether this is either flavour of out-of-memory.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(
            self,
            Self::HostOutOfMemory { .. } | Self::ArenaExhausted { .. }
        )
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity => write!(f, "arena capacity must be non-zero"),
            Self::InvalidSize => write!(f, "allocation size must be non-zero"),
            Self::HostOutOfMemory { requested } => {
                write!(f, "host out of memory: could not reserve {requested} bytes")
            }
            Self::ArenaExhausted {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "arena exhausted: requested {requested} bytes, {remaining} bytes remaining"
                )
            }
            Self::InvalidPointer { address, fault } => {
                write!(f, "invalid pointer {address:#x}: {fault}")
            }
        }
    }
}

impl Error for ArenaError {}

impl From<RegionError> for ArenaError {
    fn from(err: RegionError) -> Self {
        match err {
            RegionError::InvalidCapacity => Self::InvalidCapacity,
            RegionError::OutOfMemory { requested } => Self::HostOutOfMemory { requested },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_oom_flavours_are_out_of_memory() {
        assert!(ArenaError::HostOutOfMemory { requested: 1 }.is_out_of_memory());
        assert!(ArenaError::ArenaExhausted {
            requested: 1,
            remaining: 0
        }
        .is_out_of_memory());
        assert!(!ArenaError::InvalidSize.is_out_of_memory());
    }

    #[test]
    fn region_errors_map_to_arena_errors() {
        assert_eq!(
            ArenaError::from(RegionError::InvalidCapacity),
            ArenaError::InvalidCapacity
        );
        assert_eq!(
            ArenaError::from(RegionError::OutOfMemory { requested: 10 }),
            ArenaError::HostOutOfMemory { requested: 10 }
        );
    }

    #[test]
    fn invalid_pointer_display_is_hex() {
        let err = ArenaError::InvalidPointer {
            address: 0x1000,
            fault: PointerFault::Freed,
        };
        assert_eq!(
            err.to_string(),
            "invalid pointer 0x1000: block is already free"
        );
    }
}
