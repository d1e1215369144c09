//! Chain position: block height plus wall-clock time.
//!
//! Voting windows are gated on block height; timelock ETAs are gated on
//! timestamps. Both travel together as a [`ChainTime`].

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A block height on the host ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHeight(u64);

impl BlockHeight {
    pub const GENESIS: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, blocks: u64) -> Self {
        Self(self.0.saturating_add(blocks))
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The current position of the host chain, passed to every governor call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTime {
    pub height: BlockHeight,
    pub timestamp: Timestamp,
}

impl ChainTime {
    pub fn new(height: u64, timestamp_secs: u64) -> Self {
        Self {
            height: BlockHeight::new(height),
            timestamp: Timestamp::new(timestamp_secs),
        }
    }
}
