//! Nullable chain clock: deterministic block height and time for testing.

use qv_types::ChainTime;
use std::cell::Cell;

/// A deterministic chain for testing.
///
/// Blocks and time only advance when you tell them to. Advancing blocks also
/// advances time by [`NullChain::BLOCK_TIME_SECS`] per block.
pub struct NullChain {
    height: Cell<u64>,
    timestamp: Cell<u64>,
}

impl NullChain {
    /// Seconds per block, matching a 15 second block cadence.
    pub const BLOCK_TIME_SECS: u64 = 15;

    pub fn new(initial_height: u64, initial_secs: u64) -> Self {
        Self {
            height: Cell::new(initial_height),
            timestamp: Cell::new(initial_secs),
        }
    }

    /// Get the current chain position.
    pub fn now(&self) -> ChainTime {
        ChainTime::new(self.height.get(), self.timestamp.get())
    }

    /// Mine `blocks` blocks.
    pub fn advance_blocks(&self, blocks: u64) {
        self.height.set(self.height.get() + blocks);
        self.timestamp
            .set(self.timestamp.get() + blocks * Self::BLOCK_TIME_SECS);
    }

    /// Advance wall-clock time without mining.
    pub fn advance_secs(&self, secs: u64) {
        self.timestamp.set(self.timestamp.get() + secs);
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new(1, 1_600_000_000)
    }
}
