//! Point-in-time arena accounting.

use std::fmt;

/// A snapshot of an arena's counters.
///
/// Every carved byte belongs to exactly one block, so
/// `live_bytes + free_bytes == high_water_mark` and
/// `high_water_mark + remaining == capacity` always hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Size of the backing region in bytes.
    pub capacity: usize,
    /// Bytes ever carved into blocks.
    pub high_water_mark: usize,
    /// Total length of blocks currently handed out.
    pub live_bytes: usize,
    /// Total length of blocks currently free for reuse.
    pub free_bytes: usize,
    /// Untouched bytes past the high-water mark.
    pub remaining: usize,
    /// Number of blocks ever carved.
    pub block_count: usize,
    /// Number of those blocks that are currently free.
    pub free_block_count: usize,
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} bytes carved, {} live, {} free in {}/{} blocks",
            self.high_water_mark,
            self.capacity,
            self.live_bytes,
            self.free_bytes,
            self.free_block_count,
            self.block_count
        )
    }
}
