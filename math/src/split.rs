//! Exact even splits of raw stake across child proposals.

use crate::error::MathError;

/// Split `total` into `parts` shares of `total / parts`, adding the remainder
/// to the last share so the shares always sum to exactly `total`.
pub fn split_even(total: u128, parts: usize) -> Result<Vec<u128>, MathError> {
    if parts == 0 {
        return Err(MathError::ZeroParts);
    }
    let divisor = parts as u128;
    let share = total / divisor;
    let remainder = total % divisor;
    let mut shares = vec![share; parts];
    if let Some(last) = shares.last_mut() {
        *last += remainder;
    }
    Ok(shares)
}
