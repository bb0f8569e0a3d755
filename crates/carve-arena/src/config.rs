//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for a block arena.
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the backing region in bytes. Must be non-zero.
    ///
    /// Default: 65_536 (64KB).
    pub capacity: usize,

    /// Number of block records to pre-allocate metadata for.
    ///
    /// The block table grows past this on demand; sizing it to the expected
    /// number of distinct blocks keeps steady-state allocation free of
    /// metadata reallocation. Values above `capacity` are clamped, since
    /// every block holds at least one byte. Default: 64.
    pub block_slots: usize,
}

impl ArenaConfig {
    /// Default region size: 64KB.
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    /// Default number of pre-allocated block records.
    pub const DEFAULT_BLOCK_SLOTS: usize = 64;

    /// Create a config for a region of `capacity` bytes.
    ///
    /// Uses default values for all other parameters.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            block_slots: Self::DEFAULT_BLOCK_SLOTS,
        }
    }

    /// Replace the number of pre-allocated block records.
    pub fn with_block_slots(mut self, block_slots: usize) -> Self {
        self.block_slots = block_slots;
        self
    }

    /// Block records the table is pre-sized for.
    ///
    /// An arena of `capacity` bytes never holds more than `capacity` blocks.
    pub fn table_slots(&self) -> usize {
        self.block_slots.min(self.capacity)
    }

    /// Check the config before any memory is reserved.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity == 0 {
            return Err(ArenaError::InvalidCapacity);
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_64kb() {
        let config = ArenaConfig::default();
        assert_eq!(config.capacity, 64 * 1024);
        assert_eq!(config.block_slots, ArenaConfig::DEFAULT_BLOCK_SLOTS);
    }

    #[test]
    fn zero_capacity_fails_validation() {
        assert_eq!(
            ArenaConfig::new(0).validate(),
            Err(ArenaError::InvalidCapacity)
        );
        assert!(ArenaConfig::new(1).validate().is_ok());
    }

    #[test]
    fn builder_replaces_block_slots() {
        let config = ArenaConfig::new(128).with_block_slots(4);
        assert_eq!(config.capacity, 128);
        assert_eq!(config.block_slots, 4);
    }

    #[test]
    fn table_slots_never_exceed_capacity() {
        assert_eq!(ArenaConfig::new(128).with_block_slots(4).table_slots(), 4);
        assert_eq!(ArenaConfig::new(64).with_block_slots(64).table_slots(), 64);
        let oversized = ArenaConfig::new(64).with_block_slots(usize::MAX);
        assert!(oversized.validate().is_ok());
        assert_eq!(oversized.table_slots(), 64);
    }
}
