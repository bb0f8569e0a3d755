//! Test utilities and instrumented hosts for Carve development.
//!
//! Provides [`CountingHost`], which records every reserve and release it
//! forwards to [`HeapHost`], and [`FailingHost`], which refuses every
//! reservation. Both implement [`Host`] so they can be plugged into a
//! `Region` or an `Arena` directly.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::Cell;
use std::num::NonZeroUsize;
use std::ptr::NonNull;
use std::rc::Rc;

use carve_region::{HeapHost, Host, RegionError};

/// Reserve/release counters shared between a [`CountingHost`] and the test.
#[derive(Debug, Default)]
pub struct HostLedger {
    reserves: Cell<usize>,
    releases: Cell<usize>,
    outstanding_bytes: Cell<usize>,
}

impl HostLedger {
    pub fn reserves(&self) -> usize {
        self.reserves.get()
    }

    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    /// Bytes reserved and not yet released.
    pub fn outstanding_bytes(&self) -> usize {
        self.outstanding_bytes.get()
    }
}

/// A [`HeapHost`] that records its traffic in a shared [`HostLedger`].
///
/// Optionally refuses reservations above `limit` bytes, to exercise the
/// host-level out-of-memory path.
#[derive(Clone, Debug, Default)]
pub struct CountingHost {
    ledger: Rc<HostLedger>,
    limit: Option<usize>,
}

impl CountingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that refuses any reservation larger than `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            ledger: Rc::default(),
            limit: Some(limit),
        }
    }

    /// Handle to the counters; stays readable after the host is dropped.
    pub fn ledger(&self) -> Rc<HostLedger> {
        Rc::clone(&self.ledger)
    }
}

impl Host for CountingHost {
    fn reserve(&self, capacity: NonZeroUsize) -> Result<NonNull<u8>, RegionError> {
        if self.limit.is_some_and(|limit| capacity.get() > limit) {
            return Err(RegionError::OutOfMemory {
                requested: capacity.get(),
            });
        }
        let base = HeapHost.reserve(capacity)?;
        let ledger = &self.ledger;
        ledger.reserves.set(ledger.reserves.get() + 1);
        ledger
            .outstanding_bytes
            .set(ledger.outstanding_bytes.get() + capacity.get());
        Ok(base)
    }

    unsafe fn release(&self, base: NonNull<u8>, capacity: NonZeroUsize) {
        let ledger = &self.ledger;
        ledger.releases.set(ledger.releases.get() + 1);
        let outstanding = ledger.outstanding_bytes.get();
        assert!(
            outstanding >= capacity.get(),
            "released {} bytes with only {outstanding} outstanding",
            capacity.get()
        );
        ledger.outstanding_bytes.set(outstanding - capacity.get());
        // SAFETY: forwarded unchanged from our caller, and `base` came from
        // `HeapHost::reserve` in `reserve` above.
        unsafe { HeapHost.release(base, capacity) };
    }
}

/// A host with no memory at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingHost;

impl Host for FailingHost {
    fn reserve(&self, capacity: NonZeroUsize) -> Result<NonNull<u8>, RegionError> {
        Err(RegionError::OutOfMemory {
            requested: capacity.get(),
        })
    }

    unsafe fn release(&self, _base: NonNull<u8>, _capacity: NonZeroUsize) {
        unreachable!("FailingHost never hands out a reservation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carve_region::Region;

    #[test]
    fn region_drop_releases_once() {
        let host = CountingHost::new();
        let ledger = host.ledger();
        {
            let _region = Region::reserve(128, host).unwrap();
            assert_eq!(ledger.reserves(), 1);
            assert_eq!(ledger.outstanding_bytes(), 128);
            assert_eq!(ledger.releases(), 0);
        }
        assert_eq!(ledger.releases(), 1);
        assert_eq!(ledger.outstanding_bytes(), 0);
    }

    #[test]
    #[should_panic(expected = "outstanding")]
    fn unmatched_release_is_caught() {
        let host = CountingHost::new();
        let base = host.reserve(NonZeroUsize::new(32).unwrap()).unwrap();
        // SAFETY: `base` came from `host.reserve` with the same capacity.
        unsafe { host.release(base, NonZeroUsize::new(32).unwrap()) };
        // SAFETY: the ledger check panics before `base` is forwarded again.
        unsafe { host.release(base, NonZeroUsize::new(32).unwrap()) };
    }

    #[test]
    fn limit_refuses_large_reservations() {
        let host = CountingHost::with_limit(64);
        let ledger = host.ledger();
        let err = Region::reserve(65, host).unwrap_err();
        assert_eq!(err, RegionError::OutOfMemory { requested: 65 });
        assert_eq!(ledger.reserves(), 0);
        assert_eq!(ledger.releases(), 0);
    }

    #[test]
    fn failing_host_never_reserves() {
        let err = Region::reserve(1, FailingHost).unwrap_err();
        assert_eq!(err, RegionError::OutOfMemory { requested: 1 });
    }
}
