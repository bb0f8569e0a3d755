//! Block records and the block table.
//!
//! A block is one `[offset, offset + len)` range carved from the region,
//! plus a free flag. Blocks are keyed by offset in an insertion-ordered
//! [`IndexMap`], so lookups by address and ordered first-fit scans both go
//! through the same stored record. Nothing outside this module can reach a
//! `Block` except through the table.

use indexmap::IndexMap;

use crate::error::PointerFault;

/// The stored state of one block. The offset is the table key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Block {
    /// Fixed at creation; never shrinks or grows.
    len: usize,
    free: bool,
}

/// Public snapshot of a block record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Byte offset from the region base.
    pub offset: usize,
    /// Length in bytes as originally carved.
    pub len: usize,
    /// Whether the block is available for reuse.
    pub free: bool,
}

/// Every block ever carved, in scan order.
#[derive(Debug, Default)]
pub(crate) struct BlockTable {
    blocks: IndexMap<usize, Block>,
    free_count: usize,
}

impl BlockTable {
    /// Pre-size for `slots` records. If the metadata cannot be reserved the
    /// table starts empty and grows on demand.
    pub(crate) fn with_capacity(slots: usize) -> Self {
        let mut blocks = IndexMap::new();
        if let Err(err) = blocks.try_reserve(slots) {
            tracing::debug!(slots, %err, "block table pre-size skipped");
        }
        Self {
            blocks,
            free_count: 0,
        }
    }

    /// Index of the first free block in scan order that holds `size` bytes.
    ///
    /// Every free re-sorts the table by length, and claiming a block never
    /// reorders it, so free blocks are always in ascending length order and
    /// the first fit is also the smallest fit.
    pub(crate) fn find_free(&self, size: usize) -> Option<usize> {
        if self.free_count == 0 {
            return None;
        }
        self.blocks.values().position(|b| b.free && b.len >= size)
    }

    /// Mark the free block at `index` as used. Returns its offset and length.
    pub(crate) fn claim(&mut self, index: usize) -> Option<(usize, usize)> {
        let (&offset, block) = self.blocks.get_index_mut(index)?;
        debug_assert!(block.free, "claimed a block that was not free");
        block.free = false;
        self.free_count -= 1;
        Some((offset, block.len))
    }

    /// Append a freshly carved, in-use block.
    pub(crate) fn push(&mut self, offset: usize, len: usize) {
        debug_assert!(len > 0);
        let prev = self.blocks.insert(offset, Block { len, free: false });
        debug_assert!(prev.is_none(), "carved over an existing block");
    }

    /// Mark the in-use block starting at `offset` as free. Returns its length.
    pub(crate) fn release(&mut self, offset: usize) -> Result<usize, PointerFault> {
        let block = self.blocks.get_mut(&offset).ok_or(PointerFault::Foreign)?;
        if block.free {
            return Err(PointerFault::Freed);
        }
        block.free = true;
        self.free_count += 1;
        Ok(block.len)
    }

    /// Length of the in-use block starting at `offset`.
    pub(crate) fn used_len(&self, offset: usize) -> Result<usize, PointerFault> {
        match self.blocks.get(&offset) {
            None => Err(PointerFault::Foreign),
            Some(block) if block.free => Err(PointerFault::Freed),
            Some(block) => Ok(block.len),
        }
    }

    /// Stable re-sort of the scan order by ascending length.
    pub(crate) fn sort_by_len(&mut self) {
        self.blocks.sort_by(|_, a, _, b| a.len.cmp(&b.len));
    }

    pub(crate) fn get(&self, offset: usize) -> Option<BlockInfo> {
        self.blocks.get(&offset).map(|b| BlockInfo {
            offset,
            len: b.len,
            free: b.free,
        })
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        self.blocks.iter().map(|(&offset, b)| BlockInfo {
            offset,
            len: b.len,
            free: b.free,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }

    pub(crate) fn free_count(&self) -> usize {
        self.free_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(blocks: &[(usize, usize, bool)]) -> BlockTable {
        let mut t = BlockTable::default();
        for &(offset, len, free) in blocks {
            t.push(offset, len);
            if free {
                t.release(offset).unwrap();
            }
        }
        t
    }

    #[test]
    fn release_mutates_stored_record() {
        let mut t = table(&[(0, 8, false)]);
        assert_eq!(t.release(0), Ok(8));
        assert_eq!(t.get(0).map(|b| b.free), Some(true));
        assert_eq!(t.free_count(), 1);
    }

    #[test]
    fn release_twice_is_freed_fault() {
        let mut t = table(&[(0, 8, true)]);
        assert_eq!(t.release(0), Err(PointerFault::Freed));
        assert_eq!(t.free_count(), 1);
    }

    #[test]
    fn release_unknown_offset_is_foreign() {
        let mut t = table(&[(0, 8, false)]);
        assert_eq!(t.release(4), Err(PointerFault::Foreign));
    }

    #[test]
    fn first_fit_takes_earliest_fitting_block() {
        let t = table(&[(0, 32, true), (32, 8, true), (40, 16, true)]);
        assert_eq!(t.find_free(8), Some(0));
        assert_eq!(t.find_free(20), Some(0));
        assert_eq!(t.find_free(33), None);
    }

    #[test]
    fn find_free_skips_used_blocks() {
        let t = table(&[(0, 64, false), (64, 8, true)]);
        assert_eq!(t.find_free(4), Some(1));
        assert_eq!(t.find_free(16), None);
    }

    #[test]
    fn claim_marks_used_and_returns_location() {
        let mut t = table(&[(0, 4, false), (4, 12, true)]);
        assert_eq!(t.claim(1), Some((4, 12)));
        assert_eq!(t.get(4).map(|b| b.free), Some(false));
        assert_eq!(t.free_count(), 0);
    }

    #[test]
    fn sort_by_len_is_stable() {
        let mut t = table(&[(0, 16, false), (16, 4, false), (20, 16, false), (36, 4, false)]);
        t.sort_by_len();
        let order: Vec<usize> = t.iter().map(|b| b.offset).collect();
        assert_eq!(order, vec![16, 36, 0, 20]);
        // Keyed lookup survives reordering.
        assert_eq!(t.used_len(20), Ok(16));
    }

    #[test]
    fn used_len_distinguishes_faults() {
        let t = table(&[(0, 4, false), (4, 4, true)]);
        assert_eq!(t.used_len(0), Ok(4));
        assert_eq!(t.used_len(4), Err(PointerFault::Freed));
        assert_eq!(t.used_len(2), Err(PointerFault::Foreign));
    }
}
