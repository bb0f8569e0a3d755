//! The owned backing region.

#![allow(unsafe_code)]

use std::num::NonZeroUsize;
use std::ptr::NonNull;

use crate::error::RegionError;
use crate::host::{DefaultHost, Host};

/// One contiguous reservation of zeroed, read/write memory.
///
/// The region is reserved in [`Region::reserve`] and released in `Drop`,
/// so a reservation is returned to its host exactly once on every exit
/// path. Callers address the region either by raw address or by byte
/// offset from [`base`](Region::base); the bounds-checked views
/// [`bytes`](Region::bytes) and [`bytes_mut`](Region::bytes_mut) are the
/// only safe way to read or write its contents.
#[derive(Debug)]
pub struct Region<H: Host = DefaultHost> {
    base: NonNull<u8>,
    capacity: NonZeroUsize,
    host: H,
}

// SAFETY: the region exclusively owns its reservation; moving it to another
// thread moves that ownership with it. Writes require `&mut self`. `Sync`
// is not implemented.
unsafe impl<H: Host + Send> Send for Region<H> {}

impl Region<DefaultHost> {
    /// Reserve `capacity` bytes from the default host.
    pub fn new(capacity: usize) -> Result<Self, RegionError> {
        Self::reserve(capacity, DefaultHost::default())
    }
}

impl<H: Host> Region<H> {
    /// Reserve `capacity` bytes from `host`.
    ///
    /// Returns [`RegionError::InvalidCapacity`] for a zero capacity and
    /// [`RegionError::OutOfMemory`] if the host refuses the request.
    pub fn reserve(capacity: usize, host: H) -> Result<Self, RegionError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(RegionError::InvalidCapacity)?;
        let base = match host.reserve(capacity) {
            Ok(base) => base,
            Err(err) => {
                tracing::debug!(size_bytes = capacity.get(), %err, "region reservation failed");
                return Err(err);
            }
        };
        tracing::debug!(address = ?base, size_bytes = capacity.get(), "region reserved");
        Ok(Self {
            base,
            capacity,
            host,
        })
    }

    /// Address of the first byte of the region.
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Size of the region in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// The host this region was reserved from.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Byte offset of `addr` from the base, if `addr` lies inside the region.
    pub fn offset_of(&self, addr: *const u8) -> Option<usize> {
        let offset = addr.addr().checked_sub(self.base.as_ptr().addr())?;
        (offset < self.capacity.get()).then_some(offset)
    }

    /// Whether `addr` lies inside `[base, base + capacity)`.
    pub fn contains(&self, addr: *const u8) -> bool {
        self.offset_of(addr).is_some()
    }

    /// Pointer to the byte at `offset`, or `None` if it is out of bounds.
    pub fn ptr_at(&self, offset: usize) -> Option<NonNull<u8>> {
        if offset >= self.capacity.get() {
            return None;
        }
        // SAFETY: `offset < capacity`, so the result stays inside the
        // reservation and cannot be null.
        Some(unsafe { self.base.add(offset) })
    }

    /// Shared view of `len` bytes starting at `offset`.
    ///
    /// Returns `None` if the range does not fit inside the region.
    pub fn bytes(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.check_range(offset, len)?;
        // SAFETY: the range is in bounds, every byte of the reservation was
        // initialised by the host, and the borrow is tied to `&self`.
        Some(unsafe { std::slice::from_raw_parts(self.base.as_ptr().add(offset), len) })
    }

    /// Mutable view of `len` bytes starting at `offset`.
    ///
    /// Returns `None` if the range does not fit inside the region.
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        self.check_range(offset, len)?;
        // SAFETY: as in `bytes`, and the `&mut self` borrow guarantees no
        // other view into the region is live.
        Some(unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr().add(offset), len) })
    }

    fn check_range(&self, offset: usize, len: usize) -> Option<()> {
        let end = offset.checked_add(len)?;
        (end <= self.capacity.get()).then_some(())
    }
}

impl<H: Host> Drop for Region<H> {
    fn drop(&mut self) {
        tracing::debug!(
            address = ?self.base,
            size_bytes = self.capacity.get(),
            "releasing region"
        );
        // SAFETY: `base` and `capacity` came from `host.reserve` in
        // `Region::reserve`, and `drop` runs at most once.
        unsafe { self.host.release(self.base, self.capacity) };
    }
}
