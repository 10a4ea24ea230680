//! Capability interfaces between the convergence driver and equation models.

use crate::error::Result;
use crate::metric::StateNorm;
use crate::options::DenseOutput;
use crate::series::Trajectory;

/// A closed-form solution of a differential equation.
pub trait AnalyticSolution<S>: Send + Sync {
    /// Exact state at time `t`.
    fn evaluate(&self, t: f64) -> S;

    /// Exact states at each of `times`, in the same order.
    fn evaluate_series(&self, times: &[f64]) -> Vec<S> {
        times.iter().map(|&t| self.evaluate(t)).collect()
    }
}

/// Wraps a plain function of time as an [`AnalyticSolution`].
pub struct ClosedForm<F> {
    function: F,
}

impl<F> ClosedForm<F> {
    pub fn new(function: F) -> Self {
        Self { function }
    }
}

impl<S, F> AnalyticSolution<S> for ClosedForm<F>
where
    F: Fn(f64) -> S + Send + Sync,
{
    fn evaluate(&self, t: f64) -> S {
        (self.function)(t)
    }
}

/// A differential equation that can be solved numerically with dense output.
///
/// Ordinary, delay and relay equations all implement this trait; the driver
/// never needs to know which variant it is sweeping.
pub trait DifferentialModel: Sync {
    /// State space of the equation.
    type State: StateNorm;

    /// Integrates over `[0, horizon]` with a fixed `step_size`, taking initial
    /// data from `reference`, and samples the dense reconstruction.
    fn solution(
        &self,
        step_size: f64,
        horizon: f64,
        reference: &dyn AnalyticSolution<Self::State>,
        dense: DenseOutput,
    ) -> Result<Trajectory<Self::State>>;

    /// Known exact solutions. Never empty.
    fn analytic_solutions(&self) -> &[Box<dyn AnalyticSolution<Self::State>>];
}

impl<M: DifferentialModel + ?Sized> DifferentialModel for Box<M> {
    type State = M::State;

    fn solution(
        &self,
        step_size: f64,
        horizon: f64,
        reference: &dyn AnalyticSolution<Self::State>,
        dense: DenseOutput,
    ) -> Result<Trajectory<Self::State>> {
        (**self).solution(step_size, horizon, reference, dense)
    }

    fn analytic_solutions(&self) -> &[Box<dyn AnalyticSolution<Self::State>>] {
        (**self).analytic_solutions()
    }
}
