//! The convergence driver: sweeps step sizes and measures dense-output error.

use log::{debug, info};
use rayon::prelude::*;

use crate::error::{ensure_positive, ConvergenceError, Result};
use crate::metric::max_deviation;
use crate::model::{AnalyticSolution, DifferentialModel};
use crate::options::{ConvergenceOptions, DenseOutput, Execution};
use crate::series::ConvergenceCurve;
use crate::stepsizes::geometric_steps;

/// Error of the dense reconstruction at one step size against `reference`.
pub fn dense_error<M: DifferentialModel + ?Sized>(
    model: &M,
    reference: &dyn AnalyticSolution<M::State>,
    step_size: f64,
    horizon: f64,
    dense: DenseOutput,
) -> Result<f64> {
    let trajectory = model.solution(step_size, horizon, reference, dense)?;
    let exact = reference.evaluate_series(trajectory.times());
    max_deviation(trajectory.states(), &exact)
}

fn reference_solution<M: DifferentialModel + ?Sized>(
    model: &M,
    index: usize,
) -> Result<&dyn AnalyticSolution<M::State>> {
    let solutions = model.analytic_solutions();
    solutions
        .get(index)
        .map(|solution| solution.as_ref())
        .ok_or(ConvergenceError::MissingAnalyticSolution {
            index,
            available: solutions.len(),
        })
}

/// Measures the dense-output error for every entry of `step_sizes`.
///
/// `errors[i]` always belongs to `step_sizes[i]`. Sequential execution visits
/// the step sizes from the largest to the smallest; the first failure aborts
/// the sweep.
pub fn convergence_errors<M: DifferentialModel + ?Sized>(
    model: &M,
    horizon: f64,
    step_sizes: &[f64],
    options: &ConvergenceOptions,
) -> Result<Vec<f64>> {
    ensure_positive("time horizon", horizon)?;
    let reference = reference_solution(model, options.reference_solution)?;
    let dense = options.dense_output;

    match options.execution {
        Execution::Sequential => {
            let mut order: Vec<usize> = (0..step_sizes.len()).collect();
            order.sort_by(|&i, &j| step_sizes[j].total_cmp(&step_sizes[i]));

            let mut errors = vec![0.0; step_sizes.len()];
            for index in order {
                let step_size = step_sizes[index];
                let error = dense_error(model, reference, step_size, horizon, dense)?;
                debug!("h={step_size:e} error={error:e}");
                errors[index] = error;
            }
            Ok(errors)
        }
        Execution::Parallel => step_sizes
            .par_iter()
            .map(|&step_size| dense_error(model, reference, step_size, horizon, dense))
            .collect(),
    }
}

/// Runs the full study: generates the sweep, measures every error and pairs
/// the two sequences.
pub fn run_study<M: DifferentialModel + ?Sized>(
    model: &M,
    horizon: f64,
    options: &ConvergenceOptions,
) -> Result<ConvergenceCurve> {
    let sweep = &options.sweep;
    let step_sizes = geometric_steps(sweep.min_step, sweep.max_step, sweep.count)?;
    info!(
        "sweeping {} step sizes in [{}, {}] over horizon {}",
        step_sizes.len(),
        sweep.min_step,
        sweep.max_step,
        horizon
    );

    let errors = convergence_errors(model, horizon, &step_sizes, options)?;
    let curve = ConvergenceCurve::new(step_sizes, errors)?;
    if let Some(order) = estimated_order(&curve) {
        info!("observed convergence order {order:.3}");
    }
    Ok(curve)
}

/// Least-squares slope of `ln(error)` against `ln(h)`.
///
/// Points with zero or non-finite error are skipped; returns `None` when
/// fewer than two usable points remain or all step sizes coincide.
pub fn estimated_order(curve: &ConvergenceCurve) -> Option<f64> {
    let points: Vec<(f64, f64)> = curve
        .iter()
        .filter(|(h, e)| **h > 0.0 && **e > 0.0 && e.is_finite())
        .map(|(h, e)| (h.ln(), e.ln()))
        .collect();
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (covariance, variance) = points.iter().fold((0.0, 0.0), |(cov, var), (x, y)| {
        let dx = x - mean_x;
        (cov + dx * (y - mean_y), var + dx * dx)
    });
    if variance == 0.0 {
        return None;
    }
    Some(covariance / variance)
}
