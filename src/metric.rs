//! Reduction of a numerical/analytic trajectory pair to a single error value.

use nalgebra::DVector;

use crate::error::{ConvergenceError, Result};

/// State spaces that know the norm of the difference between two states.
pub trait StateNorm {
    /// Number of components. [`max_deviation`] only compares states of equal
    /// dimension.
    fn dimension(&self) -> usize {
        1
    }

    /// Norm of `self - other`. Must be non-negative and zero for equal states.
    /// Both states have the same [`dimension`](StateNorm::dimension).
    fn distance(&self, other: &Self) -> f64;
}

impl StateNorm for f64 {
    fn distance(&self, other: &Self) -> f64 {
        (self - other).abs()
    }
}

/// Euclidean norm of the component-wise difference.
impl StateNorm for DVector<f64> {
    fn dimension(&self) -> usize {
        self.len()
    }

    fn distance(&self, other: &Self) -> f64 {
        (self - other).norm()
    }
}

/// Maximum over samples of the distance between numerical and analytic states.
///
/// Returns `0.0` for empty or identical sequences and NaN as soon as any
/// sample distance is NaN. Sequences of different length, or samples of
/// different dimension, are never truncated to a common prefix.
pub fn max_deviation<S: StateNorm>(numerical: &[S], analytic: &[S]) -> Result<f64> {
    if numerical.len() != analytic.len() {
        return Err(ConvergenceError::length_mismatch(
            "dense/analytic samples",
            numerical.len(),
            analytic.len(),
        ));
    }

    numerical
        .iter()
        .zip(analytic)
        .try_fold(0.0_f64, |worst, (x, y)| {
            if x.dimension() != y.dimension() {
                return Err(ConvergenceError::length_mismatch(
                    "dense/analytic state dimension",
                    x.dimension(),
                    y.dimension(),
                ));
            }
            let distance = x.distance(y);
            // `f64::max` would discard NaN.
            Ok(if distance.is_nan() || distance > worst {
                distance
            } else {
                worst
            })
        })
}
