//! Ratio settlement.

use crate::error::MathError;
use qv_types::Ratio;

/// `floor(amount × ratio.numerator / ratio.denominator)` with checked
/// arithmetic.
pub fn apply_ratio(amount: u128, ratio: Ratio) -> Result<u128, MathError> {
    if !ratio.is_valid() {
        return Err(MathError::ZeroDenominator(ratio.to_string()));
    }
    amount
        .checked_mul(u128::from(ratio.numerator))
        .map(|scaled| scaled / u128::from(ratio.denominator))
        .ok_or(MathError::Overflow)
}
