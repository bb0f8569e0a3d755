//! The block arena.
//!
//! [`Arena`] owns one [`Region`] and a block table describing every
//! distinct block it has ever carved. Allocation first tries to reuse a
//! free block (first fit over an order kept sorted by length), then
//! falls back to carving from the untouched tail past the high-water mark.
//! Blocks are never split, merged, or returned to the host individually;
//! the whole region goes back when the arena is dropped.

use std::ptr::NonNull;

use carve_region::{DefaultHost, Host, Region};

use crate::block::{BlockInfo, BlockTable};
use crate::config::ArenaConfig;
use crate::error::{ArenaError, PointerFault};
use crate::stats::ArenaStats;

/// A fixed-capacity arena that serves byte blocks from one reservation.
///
/// # Lifecycle
///
/// Each block moves `Used -> Free -> Used -> ...`. A newly carved block
/// starts `Used`. `deallocate` makes a block reusable but does not return
/// its memory to the host; only dropping the arena does that.
///
/// # Freed memory
///
/// Blocks are not zeroed on free or on reuse. The content a caller sees
/// in a reused block is unspecified.
///
/// # Thread safety
///
/// Mutating calls take `&mut self`. An arena can be moved to another
/// thread but not shared; callers that need sharing must serialize access
/// themselves.
#[derive(Debug)]
pub struct Arena<H: Host = DefaultHost> {
    region: Region<H>,
    blocks: BlockTable,
    /// Bytes ever carved. Never decreases.
    high_water_mark: usize,
    /// Total length of blocks currently in use.
    live_bytes: usize,
}

impl Arena<DefaultHost> {
    /// Create an arena of `capacity` bytes on the default host.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Create an arena from `config` on the default host.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        Self::with_host(config, DefaultHost::default())
    }
}

impl<H: Host> Arena<H> {
    /// Create an arena from `config`, reserving its region from `host`.
    ///
    /// The config is validated before the host is asked for memory.
    pub fn with_host(config: ArenaConfig, host: H) -> Result<Self, ArenaError> {
        config.validate().map_err(reject)?;
        let region = Region::reserve(config.capacity, host).map_err(|e| reject(e.into()))?;
        Ok(Self {
            region,
            blocks: BlockTable::with_capacity(config.table_slots()),
            high_water_mark: 0,
            live_bytes: 0,
        })
    }

    /// Allocate `size` bytes.
    ///
    /// The returned pointer is valid for writes of `size` bytes until it is
    /// passed to [`deallocate`](Arena::deallocate). A reused block may be
    /// longer than `size`; the extra bytes are allocator overhead.
    ///
    /// On error the arena is unchanged.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        if size == 0 {
            return Err(reject(ArenaError::InvalidSize));
        }

        let reused = self
            .blocks
            .find_free(size)
            .and_then(|index| self.blocks.claim(index));
        if let Some((offset, len)) = reused {
            self.live_bytes += len;
            tracing::trace!(offset, len, requested = size, "reused free block");
            return Ok(self.address(offset));
        }

        let remaining = self.remaining();
        if size > remaining {
            return Err(reject(ArenaError::ArenaExhausted {
                requested: size,
                remaining,
            }));
        }

        let offset = self.high_water_mark;
        self.blocks.push(offset, size);
        self.high_water_mark += size;
        self.live_bytes += size;
        tracing::trace!(offset, len = size, "carved new block");
        Ok(self.address(offset))
    }

    /// Return the block starting at `ptr` to the free pool.
    ///
    /// Fails with [`PointerFault::Foreign`] if no block starts at `ptr`, and
    /// with [`PointerFault::Freed`] on a double free. After a successful
    /// free the scan order is re-sorted by ascending block length.
    pub fn deallocate(&mut self, ptr: NonNull<u8>) -> Result<(), ArenaError> {
        let address = ptr.as_ptr().addr();
        let offset = self.offset_of(ptr).map_err(reject)?;
        let len = self
            .blocks
            .release(offset)
            .map_err(|fault| reject(ArenaError::InvalidPointer { address, fault }))?;
        self.live_bytes -= len;
        self.blocks.sort_by_len();
        tracing::trace!(offset, len, "freed block");
        Ok(())
    }

    /// The whole in-use block starting at `ptr`, including any trailing
    /// bytes past the size originally requested.
    pub fn bytes(&self, ptr: NonNull<u8>) -> Result<&[u8], ArenaError> {
        let (offset, len) = self.used_block(ptr)?;
        Ok(in_region(self.region.bytes(offset, len)))
    }

    /// Mutable view of the whole in-use block starting at `ptr`.
    pub fn bytes_mut(&mut self, ptr: NonNull<u8>) -> Result<&mut [u8], ArenaError> {
        let (offset, len) = self.used_block(ptr)?;
        Ok(in_region(self.region.bytes_mut(offset, len)))
    }

    /// The block record starting at `ptr`, free or not.
    pub fn block(&self, ptr: NonNull<u8>) -> Option<BlockInfo> {
        let offset = self.region.offset_of(ptr.as_ptr())?;
        self.blocks.get(offset)
    }

    /// All block records in current scan order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        self.blocks.iter()
    }

    /// Whether `ptr` lies anywhere inside the backing region.
    pub fn contains(&self, ptr: *const u8) -> bool {
        self.region.contains(ptr)
    }

    /// Address of the first byte of the region.
    pub fn base(&self) -> NonNull<u8> {
        self.region.base()
    }

    /// Size of the region in bytes.
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Bytes ever carved into blocks.
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Total length of blocks currently handed out.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    /// Untouched bytes past the high-water mark.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.high_water_mark
    }

    /// Number of blocks ever carved.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of blocks currently free for reuse.
    pub fn free_block_count(&self) -> usize {
        self.blocks.free_count()
    }

    /// The host the region was reserved from.
    pub fn host(&self) -> &H {
        self.region.host()
    }

    /// Snapshot of all counters.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            capacity: self.capacity(),
            high_water_mark: self.high_water_mark,
            live_bytes: self.live_bytes,
            free_bytes: self.high_water_mark - self.live_bytes,
            remaining: self.remaining(),
            block_count: self.block_count(),
            free_block_count: self.free_block_count(),
        }
    }

    fn address(&self, offset: usize) -> NonNull<u8> {
        in_region(self.region.ptr_at(offset))
    }

    fn offset_of(&self, ptr: NonNull<u8>) -> Result<usize, ArenaError> {
        self.region
            .offset_of(ptr.as_ptr())
            .ok_or(ArenaError::InvalidPointer {
                address: ptr.as_ptr().addr(),
                fault: PointerFault::Foreign,
            })
    }

    fn used_block(&self, ptr: NonNull<u8>) -> Result<(usize, usize), ArenaError> {
        let offset = self.offset_of(ptr)?;
        let len = self
            .blocks
            .used_len(offset)
            .map_err(|fault| ArenaError::InvalidPointer {
                address: ptr.as_ptr().addr(),
                fault,
            })?;
        Ok((offset, len))
    }
}

/// Unwrap a region view of a recorded block. Every block is carved below the
/// high-water mark, which never exceeds the region capacity.
fn in_region<T>(view: Option<T>) -> T {
    view.expect("blocks always lie inside the region")
}

fn reject(err: ArenaError) -> ArenaError {
    tracing::debug!(%err, "arena call rejected");
    err
}
