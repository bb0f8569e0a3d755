//! Fixed-capacity block arena for Carve.
//!
//! An [`Arena`] reserves one region up front and serves byte blocks from
//! it without further host calls until it is dropped. Freed blocks are
//! reused whole; blocks are never split or merged.
//!
//! # Architecture
//!
//! ```text
//! Arena<H: Host>
//! ├── Region<H>        (carve-region: one reservation, released on Drop)
//! ├── BlockTable       (IndexMap<offset, Block>, scan order = sort by len)
//! ├── high_water_mark  (bytes ever carved, monotonic)
//! └── live_bytes       (total length of blocks in use)
//! ```
//!
//! # Allocation
//!
//! 1. First free block in scan order with `len >= size` is reused as-is.
//! 2. Otherwise a new block of exactly `size` bytes is carved at the
//!    high-water mark.
//! 3. Otherwise [`ArenaError::ArenaExhausted`].
//!
//! `deallocate` rejects foreign pointers and double frees, then stably
//! re-sorts the scan order by block length.
//!
//! # Safety
//!
//! This crate contains no `unsafe`. Raw addresses are translated to
//! offsets through the region, and data access goes through the
//! region's bounds-checked views.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod block;
pub mod config;
pub mod error;
pub mod stats;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use block::BlockInfo;
pub use config::ArenaConfig;
pub use error::{ArenaError, PointerFault};
pub use stats::ArenaStats;
