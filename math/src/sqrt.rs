//! Deterministic integer square root.

/// Upper bound on Newton steps for any `u128` input.
///
/// The initial guess `2^ceil(bits/2)` is within a factor of two of the root,
/// so quadratic convergence reaches the floor root in at most 7 steps
/// (including the step that detects convergence). The bound leaves headroom.
pub const SQRT_MAX_ITERATIONS: u32 = 12;

/// Floor square root: the unique `r` with `r² ≤ x < (r + 1)²`.
pub fn sqrt_int(x: u128) -> u128 {
    sqrt_int_with_steps(x).0
}

/// Floor square root, also returning the number of Newton steps taken.
pub fn sqrt_int_with_steps(x: u128) -> (u128, u32) {
    if x < 2 {
        return (x, 0);
    }
    let bits = 128 - x.leading_zeros();
    // 2^ceil(bits/2) >= sqrt(x); shift is at most 64 so this never overflows.
    let mut current = 1u128 << bits.div_ceil(2);
    let mut steps = 0;
    while steps < SQRT_MAX_ITERATIONS {
        steps += 1;
        // current >= sqrt(x), so x / current <= current <= 2^64: no overflow.
        let next = (current + x / current) / 2;
        if next >= current {
            break;
        }
        current = next;
    }
    (current, steps)
}
