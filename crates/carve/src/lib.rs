//! Carve: a fixed-capacity memory arena.
//!
//! An arena reserves one contiguous region up front and serves byte
//! blocks from it without further system calls until it is dropped.
//! Freed blocks are reused whole by later requests that fit.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Carve sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use carve::prelude::*;
//!
//! let mut arena = Arena::new(4096).unwrap();
//!
//! let a = arena.allocate(4).unwrap();
//! let b = arena.allocate(4).unwrap();
//! assert_ne!(a, b);
//!
//! arena.bytes_mut(a).unwrap().copy_from_slice(&42u32.to_ne_bytes());
//! arena.deallocate(a).unwrap();
//!
//! // The freed block is found before any new space is carved.
//! let c = arena.allocate(4).unwrap();
//! assert_eq!(c, a);
//! assert_eq!(arena.high_water_mark(), 8);
//!
//! // Double frees and foreign pointers are rejected.
//! arena.deallocate(c).unwrap();
//! assert!(matches!(
//!     arena.deallocate(c),
//!     Err(ArenaError::InvalidPointer { fault: PointerFault::Freed, .. })
//! ));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `carve-arena` | `Arena`, config, block records, stats, errors |
//! | [`region`] | `carve-region` | `Region`, the `Host` trait, `MmapHost`, `HeapHost` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Block arena (`carve-arena`).
pub use carve_arena as arena;

/// Backing region and hosts (`carve-region`).
///
/// Implement [`region::Host`] to serve arenas from custom memory.
pub use carve_region as region;

/// Common imports for typical Carve usage.
///
/// ```rust
/// use carve::prelude::*;
/// ```
pub mod prelude {
    pub use carve_arena::{Arena, ArenaConfig, ArenaError, ArenaStats, BlockInfo, PointerFault};
    pub use carve_region::{DefaultHost, HeapHost, Host, Region, RegionError};
}
