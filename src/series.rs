//! Pairs of aligned sequences: dense trajectories and convergence curves.

use nalgebra::DVector;

use crate::error::{ConvergenceError, Result};

/// Two ordered sequences whose elements correspond index by index.
///
/// Construction rejects sequences of different length, so a value of this
/// type can never pair a sample with the wrong partner.
#[derive(Clone, Debug, PartialEq)]
pub struct PairedSeries<A, B> {
    left: Vec<A>,
    right: Vec<B>,
}

/// Sample times paired with the states reconstructed at those times.
pub type Trajectory<S = DVector<f64>> = PairedSeries<f64, S>;

/// Step sizes paired with the error measured for each of them.
pub type ConvergenceCurve = PairedSeries<f64, f64>;

impl<A, B> PairedSeries<A, B> {
    /// Pairs two sequences after checking that their lengths agree.
    pub fn new(left: Vec<A>, right: Vec<B>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(ConvergenceError::length_mismatch(
                "paired series",
                left.len(),
                right.len(),
            ));
        }
        Ok(Self { left, right })
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether the series holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Iterates over aligned pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&A, &B)> {
        self.left.iter().zip(self.right.iter())
    }

    /// Splits the series back into its two sequences.
    pub fn into_parts(self) -> (Vec<A>, Vec<B>) {
        (self.left, self.right)
    }
}

impl<S> PairedSeries<f64, S> {
    /// Sample times of a trajectory.
    pub fn times(&self) -> &[f64] {
        &self.left
    }

    /// States of a trajectory, aligned with [`times`](Self::times).
    pub fn states(&self) -> &[S] {
        &self.right
    }
}

impl PairedSeries<f64, f64> {
    /// Step sizes of a convergence curve.
    pub fn step_sizes(&self) -> &[f64] {
        &self.left
    }

    /// Errors of a convergence curve, aligned with [`step_sizes`](Self::step_sizes).
    pub fn errors(&self) -> &[f64] {
        &self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unequal_lengths() {
        let result = Trajectory::<f64>::new(vec![0.0, 1.0], vec![0.0]);
        assert!(matches!(
            result,
            Err(ConvergenceError::LengthMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn keeps_pairs_aligned() {
        let curve = ConvergenceCurve::new(vec![0.1, 0.2], vec![1e-4, 2e-3]).unwrap();
        assert_eq!(curve.len(), 2);
        let pairs: Vec<_> = curve.iter().map(|(h, e)| (*h, *e)).collect();
        assert_eq!(pairs, vec![(0.1, 1e-4), (0.2, 2e-3)]);
        assert_eq!(curve.step_sizes(), &[0.1, 0.2]);
        assert_eq!(curve.errors(), &[1e-4, 2e-3]);
    }
}
