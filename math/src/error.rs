//! Vote-math errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("arithmetic overflow in vote math")]
    Overflow,

    #[error("cannot split an amount into zero parts")]
    ZeroParts,

    #[error("ratio {0} has a zero denominator")]
    ZeroDenominator(String),
}
