//! Stake units.
//!
//! Stake is represented as fixed-point integers (u128 raw units) to avoid
//! floating-point errors. One whole governance token is `STAKE_UNIT` raw.

/// Raw units per whole governance token (18 decimals).
pub const STAKE_UNIT: u128 = 1_000_000_000_000_000_000;

/// Convert a number of whole tokens to raw units.
///
/// # Panics
/// Panics on overflow; only meant for constants and test fixtures.
pub const fn whole_tokens(tokens: u128) -> u128 {
    tokens * STAKE_UNIT
}

/// Render a raw amount as `whole.fraction` tokens, trimming trailing zeros.
pub fn format_stake(raw: u128) -> String {
    let whole = raw / STAKE_UNIT;
    let frac = raw % STAKE_UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:018}", frac);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_tokens_scales_by_unit() {
        assert_eq!(whole_tokens(100_000), 100_000_000_000_000_000_000_000);
    }

    #[test]
    fn format_trims_fraction() {
        assert_eq!(format_stake(whole_tokens(42)), "42");
        assert_eq!(format_stake(STAKE_UNIT / 4 * 3), "0.75");
        assert_eq!(format_stake(33_333_333_333_333_333_333_333), "33333.333333333333333333");
    }
}
