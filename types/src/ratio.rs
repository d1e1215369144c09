//! Exact rational multipliers for refund settlement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A multiplier expressed as `numerator / denominator`.
///
/// Refund multipliers (1.5×, 0.75×) are kept as integer ratios so settlement
/// never touches floating point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: u64,
    pub denominator: u64,
}

impl Ratio {
    pub const ZERO: Self = Self::new(0, 1);
    pub const ONE: Self = Self::new(1, 1);
    pub const THREE_HALVES: Self = Self::new(3, 2);
    pub const THREE_QUARTERS: Self = Self::new(3, 4);

    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// A ratio with a zero denominator is never valid.
    pub fn is_valid(&self) -> bool {
        self.denominator != 0
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
