//! Hosts that hand out raw backing memory.
//!
//! A [`Host`] is the only place a Carve arena touches the operating system
//! or the global allocator. Two hosts ship with the crate:
//!
//! - [`MmapHost`] (unix only): an anonymous private `mmap` mapping. Pages
//!   are zero-filled by the kernel and page-aligned.
//! - [`HeapHost`]: a zeroed allocation from the global allocator, aligned
//!   to [`HeapHost::ALIGN`]. Used where `mmap` is unavailable.
//!
//! [`DefaultHost`] picks `MmapHost` on unix and `HeapHost` elsewhere.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::num::NonZeroUsize;
use std::ptr::NonNull;

use crate::error::RegionError;

/// A source of zero-initialised, readable and writable memory.
///
/// Implementations must return memory that stays valid and unaliased
/// until the matching [`release`](Host::release).
pub trait Host {
    /// Reserve `capacity` bytes of zeroed, read/write memory.
    fn reserve(&self, capacity: NonZeroUsize) -> Result<NonNull<u8>, RegionError>;

    /// Return a reservation to the host.
    ///
    /// # Safety
    ///
    /// `base` and `capacity` must come from a successful call to
    /// [`reserve`](Host::reserve) on this host, and the reservation must not
    /// have been released already. `base` must not be used afterwards.
    unsafe fn release(&self, base: NonNull<u8>, capacity: NonZeroUsize);
}

/// Host backed by the Rust global allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapHost;

impl HeapHost {
    /// Alignment of every reservation made through this host.
    pub const ALIGN: usize = 16;

    fn layout(capacity: NonZeroUsize) -> Result<Layout, RegionError> {
        Layout::from_size_align(capacity.get(), Self::ALIGN).map_err(|_| RegionError::OutOfMemory {
            requested: capacity.get(),
        })
    }
}

impl Host for HeapHost {
    fn reserve(&self, capacity: NonZeroUsize) -> Result<NonNull<u8>, RegionError> {
        let layout = Self::layout(capacity)?;
        // SAFETY: `layout` has a non-zero size because `capacity` is non-zero.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(ptr).ok_or(RegionError::OutOfMemory {
            requested: capacity.get(),
        })
    }

    unsafe fn release(&self, base: NonNull<u8>, capacity: NonZeroUsize) {
        // SAFETY: the same size and alignment passed `Layout::from_size_align`
        // in `reserve`, which is the only way to obtain `base`.
        let layout = unsafe { Layout::from_size_align_unchecked(capacity.get(), Self::ALIGN) };
        // SAFETY: caller guarantees `base` came from `reserve` with this
        // capacity and has not been released.
        unsafe { alloc::dealloc(base.as_ptr(), layout) };
    }
}

/// Host backed by anonymous private `mmap` mappings.
#[cfg(unix)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MmapHost;

#[cfg(unix)]
impl Host for MmapHost {
    fn reserve(&self, capacity: NonZeroUsize) -> Result<NonNull<u8>, RegionError> {
        // SAFETY: an anonymous mapping with a null hint has no preconditions
        // beyond a non-zero length.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                capacity.get(),
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(RegionError::OutOfMemory {
                requested: capacity.get(),
            });
        }
        NonNull::new(ptr.cast::<u8>()).ok_or(RegionError::OutOfMemory {
            requested: capacity.get(),
        })
    }

    unsafe fn release(&self, base: NonNull<u8>, capacity: NonZeroUsize) {
        // SAFETY: caller guarantees this is a live mapping of exactly
        // `capacity` bytes created by `reserve`.
        let rc = unsafe { libc::munmap(base.as_ptr().cast::<libc::c_void>(), capacity.get()) };
        if rc != 0 {
            tracing::warn!(
                address = ?base,
                size_bytes = capacity.get(),
                "munmap failed while releasing region"
            );
        }
    }
}

/// The host used when none is specified.
#[cfg(unix)]
pub type DefaultHost = MmapHost;

/// The host used when none is specified.
#[cfg(not(unix))]
pub type DefaultHost = HeapHost;

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn assert_zeroed_and_writable<H: Host>(host: &H, size: usize) {
        let base = host.reserve(nz(size)).unwrap();
        // SAFETY: `base` points to `size` bytes owned by this test.
        let bytes = unsafe { std::slice::from_raw_parts_mut(base.as_ptr(), size) };
        assert!(bytes.iter().all(|&b| b == 0));
        bytes[0] = 0xAB;
        bytes[size - 1] = 0xCD;
        assert_eq!(bytes[0], 0xAB);
        assert_eq!(bytes[size - 1], 0xCD);
        // SAFETY: released exactly once, with the reserved size.
        unsafe { host.release(base, nz(size)) };
    }

    #[test]
    fn heap_host_returns_zeroed_memory() {
        assert_zeroed_and_writable(&HeapHost, 4096);
    }

    #[test]
    fn heap_host_respects_alignment() {
        let base = HeapHost.reserve(nz(33)).unwrap();
        assert_eq!(base.as_ptr().addr() % HeapHost::ALIGN, 0);
        // SAFETY: released exactly once, with the reserved size.
        unsafe { HeapHost.release(base, nz(33)) };
    }

    #[test]
    fn heap_host_rejects_unrepresentable_layout() {
        let err = HeapHost.reserve(nz(usize::MAX)).unwrap_err();
        assert_eq!(err, RegionError::OutOfMemory { requested: usize::MAX });
    }

    #[cfg(unix)]
    #[test]
    fn mmap_host_returns_zeroed_memory() {
        assert_zeroed_and_writable(&MmapHost, 3 * 4096 + 17);
    }

    #[cfg(unix)]
    #[test]
    fn mmap_host_reports_failure_as_out_of_memory() {
        let err = MmapHost.reserve(nz(usize::MAX)).unwrap_err();
        assert!(matches!(err, RegionError::OutOfMemory { .. }));
    }
}
