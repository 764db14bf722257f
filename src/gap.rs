use crate::{Monomial, Polynomial};

/// Exact gap of `polynomial`:
/// `#{v | p(v) = 0} - #{v | p(v) = 1}` over all `2^variables` valuations.
///
/// Valuations are enumerated as bitmasks, bit `i` holding the value of
/// `x{i}`. A polynomial without variables has exactly one (empty)
/// valuation, so its gap is `1`.
///
/// Runs in `O(2^variables * length)` time.
pub fn gap(polynomial: &Polynomial) -> i64 {
    let masks: Vec<u64> = polynomial.iter().map(Monomial::mask).collect();
    let valuations: u64 = 1 << polynomial.variables();

    let ones = (0..valuations)
        .filter(|&valuation| parity(&masks, valuation))
        .count() as i64;
    let zeros = valuations as i64 - ones;

    zeros - ones
}

/// Probability of the all-zero outcome of the IQP circuit for a
/// polynomial with the given gap: `(gap / 2^variables)^2`
pub fn expected_probability(gap: i64, variables: usize) -> f64 {
    let amplitude = gap as f64 / 2f64.powi(variables as i32);
    amplitude * amplitude
}

/// XOR of all monomials at `valuation`
fn parity(masks: &[u64], valuation: u64) -> bool {
    masks
        .iter()
        .fold(false, |sum, &mask| sum ^ (valuation & mask == mask))
}
