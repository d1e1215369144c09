//! Vote math: the deterministic integer arithmetic behind quadratic voting.
//!
//! No floating point is used anywhere in this crate. Every function is a pure
//! function of its integer inputs and completes in a small, bounded number of
//! steps:
//! - [`sqrt_int`]: floor square root (Newton iteration, ≤ [`SQRT_MAX_ITERATIONS`])
//! - [`split_even`]: exact even split with the remainder on the last share
//! - [`apply_ratio`]: floor(amount × numerator / denominator)
//! - [`classify_tally`]: Defeated / QuorumFailed / Succeeded from a tally

pub mod error;
pub mod ratio;
pub mod split;
pub mod sqrt;
pub mod tally;

pub use error::MathError;
pub use ratio::apply_ratio;
pub use split::split_even;
pub use sqrt::{sqrt_int, sqrt_int_with_steps, SQRT_MAX_ITERATIONS};
pub use tally::{classify_tally, TallyOutcome};
