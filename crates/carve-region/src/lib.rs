//! Backing region reservation for Carve arenas.
//!
//! A [`Region`] is one contiguous, zero-initialised, read/write reservation
//! obtained from a [`Host`] exactly once and handed back exactly once when
//! the region is dropped. Everything above this crate works in offsets
//! relative to [`Region::base`] and never talks to the host directly.
//!
//! ```text
//! Region<H: Host>
//! ├── base: NonNull<u8>      (returned by H::reserve)
//! ├── capacity: NonZeroUsize
//! └── host: H                (H::release on Drop)
//! ```
//!
//! This crate is the only non-test crate in the workspace that may contain
//! `unsafe` code, confined to the `host` and `region` modules. Every
//! `unsafe` block carries a `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod host;
pub mod region;

pub use error::RegionError;
pub use host::{DefaultHost, HeapHost, Host};
#[cfg(unix)]
pub use host::MmapHost;
pub use region::Region;
