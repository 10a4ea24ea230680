//! Geometrically spaced step sizes for convergence sweeps.

use crate::error::{ConvergenceError, Result};

/// Produces `count` step sizes spaced evenly on a logarithmic scale.
///
/// The first value is exactly `lower` and the last exactly `upper`; interior
/// values follow `lower * (upper / lower)^(k / (count - 1))`. A single-point
/// sweep returns `[lower]`.
pub fn geometric_steps(lower: f64, upper: f64, count: usize) -> Result<Vec<f64>> {
    if !(lower > 0.0 && upper > 0.0 && upper >= lower) || !lower.is_finite() || !upper.is_finite()
    {
        return Err(ConvergenceError::InvalidStepRange { lower, upper });
    }
    if count == 0 {
        return Err(ConvergenceError::invalid_argument(
            "step-size count",
            count as f64,
        ));
    }
    if count == 1 {
        return Ok(vec![lower]);
    }

    let ratio = upper / lower;
    let last = count - 1;
    let steps = (0..count)
        .map(|k| match k {
            0 => lower,
            k if k == last => upper,
            k => lower * ratio.powf(k as f64 / last as f64),
        })
        .collect();
    Ok(steps)
}
