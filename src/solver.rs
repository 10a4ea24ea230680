//! Fixed-step explicit Runge–Kutta integration with dense output.
//!
//! Every completed step keeps its stage slopes, so the trajectory can be
//! reconstructed anywhere inside the step through the tableau's continuous
//! extension `x(t_n + θh) = x_n + h Σ_i b_i(θ) k_i`. The same reconstruction
//! answers delayed-argument lookups for delay equations and locates relay
//! switching times.

use log::trace;
use nalgebra::DVector;
use serde::Deserialize;

use crate::error::{ensure_positive, ConvergenceError, Result};
use crate::model::AnalyticSolution;
use crate::options::DenseOutput;
use crate::series::Trajectory;

/// Upper bound on the number of steps taken by a single integration.
pub const MAX_STEPS: usize = 10_000_000;

const BISECTION_ITERATIONS: usize = 60;

/// Explicit Runge–Kutta scheme with a continuous extension.
#[derive(Clone, Debug, PartialEq)]
pub struct ButcherTableau {
    name: &'static str,
    order: usize,
    interpolant_order: usize,
    /// Strictly lower-triangular stage coefficients, one row per stage.
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    c: Vec<f64>,
    /// Dense weights `b_i(θ)` as polynomial coefficients in ascending powers.
    bi: Vec<Vec<f64>>,
}

impl ButcherTableau {
    /// Forward Euler with linear interpolation.
    pub fn euler() -> Self {
        Self {
            name: "euler",
            order: 1,
            interpolant_order: 1,
            a: vec![vec![]],
            b: vec![1.0],
            c: vec![0.0],
            bi: vec![vec![0.0, 1.0]],
        }
    }

    /// Heun's second-order method with linear interpolation.
    pub fn heun() -> Self {
        Self {
            name: "heun",
            order: 2,
            interpolant_order: 1,
            a: vec![vec![], vec![1.0]],
            b: vec![0.5, 0.5],
            c: vec![0.0, 1.0],
            bi: vec![vec![0.0, 0.5], vec![0.0, 0.5]],
        }
    }

    /// The classic fourth-order method with its cubic continuous extension.
    pub fn classic4() -> Self {
        Self {
            name: "rk4",
            order: 4,
            interpolant_order: 3,
            a: vec![vec![], vec![0.5], vec![0.0, 0.5], vec![0.0, 0.0, 1.0]],
            b: vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
            c: vec![0.0, 0.5, 0.5, 1.0],
            bi: vec![
                vec![0.0, 1.0, -1.5, 2.0 / 3.0],
                vec![0.0, 0.0, 1.0, -2.0 / 3.0],
                vec![0.0, 0.0, 1.0, -2.0 / 3.0],
                vec![0.0, 0.0, -0.5, 2.0 / 3.0],
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Order of the step update.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Order of the continuous extension.
    pub fn interpolant_order(&self) -> usize {
        self.interpolant_order
    }

    /// Number of stages.
    pub fn stages(&self) -> usize {
        self.b.len()
    }

    /// Dense weights `b_i(θ)` evaluated with Horner's scheme.
    pub fn dense_weights(&self, theta: f64) -> Vec<f64> {
        self.bi
            .iter()
            .map(|coefficients| {
                coefficients
                    .iter()
                    .rev()
                    .fold(0.0, |acc, coefficient| acc * theta + coefficient)
            })
            .collect()
    }
}

/// Integration scheme selectable from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Euler,
    Heun,
    #[default]
    Rk4,
}

impl Method {
    pub fn tableau(self) -> ButcherTableau {
        match self {
            Self::Euler => ButcherTableau::euler(),
            Self::Heun => ButcherTableau::heun(),
            Self::Rk4 => ButcherTableau::classic4(),
        }
    }
}

/// Discrete state of a relay: which branch of the right-hand side is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Branch selected by the sign of a switching-surface value.
    pub fn of(value: f64) -> Self {
        if value < 0.0 {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    /// `+1.0` or `-1.0`.
    pub fn sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }

    fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// Right-hand side of an ordinary, delay or relay differential equation.
pub trait VectorField {
    /// Number of state components.
    fn dimension(&self) -> usize;

    /// Time derivative at `(t, state)`. Delay equations read delayed values
    /// from `past`; relay equations branch on `polarity`.
    fn derivative(
        &self,
        t: f64,
        state: &DVector<f64>,
        past: &History<'_>,
        polarity: Polarity,
    ) -> DVector<f64>;

    /// Signed distance to the relay switching surface, if the equation has one.
    fn switching_surface(&self, _t: f64, _state: &DVector<f64>) -> Option<f64> {
        None
    }
}

#[derive(Clone, Debug)]
struct StepRecord {
    start: f64,
    size: f64,
    state: DVector<f64>,
    slopes: Vec<DVector<f64>>,
}

impl StepRecord {
    fn end(&self) -> f64 {
        self.start + self.size
    }

    fn combine(&self, weights: &[f64]) -> DVector<f64> {
        let mut value = self.state.clone();
        for (weight, slope) in weights.iter().zip(&self.slopes) {
            value.axpy(self.size * weight, slope, 1.0);
        }
        value
    }

    fn interpolate(&self, tableau: &ButcherTableau, theta: f64) -> DVector<f64> {
        self.combine(&tableau.dense_weights(theta))
    }

    fn end_state(&self, tableau: &ButcherTableau) -> DVector<f64> {
        self.combine(&tableau.b)
    }
}

/// Dense reconstruction of everything integrated so far.
///
/// Times at or before the initial time come from the initial function; times
/// past the last completed step extrapolate that step's interpolant.
pub struct History<'a> {
    tableau: &'a ButcherTableau,
    initial: &'a dyn AnalyticSolution<DVector<f64>>,
    start: f64,
    steps: Vec<StepRecord>,
}

impl<'a> History<'a> {
    fn new(
        tableau: &'a ButcherTableau,
        initial: &'a dyn AnalyticSolution<DVector<f64>>,
        start: f64,
    ) -> Self {
        Self {
            tableau,
            initial,
            start,
            steps: Vec::new(),
        }
    }

    /// Reconstructed state at time `t`.
    pub fn at(&self, t: f64) -> DVector<f64> {
        if t <= self.start {
            return self.initial.evaluate(t);
        }
        let index = self.steps.partition_point(|step| step.end() < t);
        match self.steps.get(index).or_else(|| self.steps.last()) {
            Some(step) => step.interpolate(self.tableau, (t - step.start) / step.size),
            None => self.initial.evaluate(t),
        }
    }
}

fn take_step<F: VectorField + ?Sized>(
    field: &F,
    tableau: &ButcherTableau,
    history: &History<'_>,
    start: f64,
    state: &DVector<f64>,
    size: f64,
    polarity: Polarity,
) -> StepRecord {
    let mut slopes: Vec<DVector<f64>> = Vec::with_capacity(tableau.stages());
    for (row, node) in tableau.a.iter().zip(&tableau.c) {
        let mut stage = state.clone();
        for (coefficient, slope) in row.iter().zip(&slopes) {
            if *coefficient != 0.0 {
                stage.axpy(size * coefficient, slope, 1.0);
            }
        }
        let slope = field.derivative(start + node * size, &stage, history, polarity);
        slopes.push(slope);
    }
    StepRecord {
        start,
        size,
        state: state.clone(),
        slopes,
    }
}

/// Whether `state` lies on the side of the switching surface opposite to the
/// active `polarity`.
fn crossed_surface<F: VectorField + ?Sized>(
    field: &F,
    t: f64,
    state: &DVector<f64>,
    polarity: Polarity,
) -> bool {
    field
        .switching_surface(t, state)
        .is_some_and(|value| value * polarity.sign() < 0.0)
}

/// Upper end of the bisection bracket `θ ∈ (0, 1]` at which the step's
/// interpolant first crosses the switching surface.
fn locate_switch<F: VectorField + ?Sized>(
    field: &F,
    tableau: &ButcherTableau,
    record: &StepRecord,
    polarity: Polarity,
) -> f64 {
    let (mut lower, mut upper) = (0.0_f64, 1.0_f64);
    for _ in 0..BISECTION_ITERATIONS {
        let middle = 0.5 * (lower + upper);
        let t = record.start + middle * record.size;
        let state = record.interpolate(tableau, middle);
        if crossed_surface(field, t, &state, polarity) {
            upper = middle;
        } else {
            lower = middle;
        }
    }
    upper
}

/// Integrates `field` over `[0, horizon]` with fixed `step_size` and samples
/// the dense reconstruction at `dense.points` equally spaced times.
///
/// `initial` supplies the initial state and, for delay equations, the history
/// on `t <= 0`. The final step is shortened to land on the horizon.
pub fn integrate<F: VectorField + ?Sized>(
    field: &F,
    tableau: &ButcherTableau,
    step_size: f64,
    horizon: f64,
    initial: &dyn AnalyticSolution<DVector<f64>>,
    dense: DenseOutput,
) -> Result<Trajectory> {
    ensure_positive("step size", step_size)?;
    ensure_positive("time horizon", horizon)?;
    if dense.points < 2 {
        return Err(ConvergenceError::invalid_argument(
            "dense output points",
            dense.points as f64,
        ));
    }

    let mut history = History::new(tableau, initial, 0.0);
    let mut t = 0.0_f64;
    let mut state = initial.evaluate(t);
    if state.len() != field.dimension() {
        return Err(ConvergenceError::length_mismatch(
            "initial state",
            field.dimension(),
            state.len(),
        ));
    }
    let mut polarity = field
        .switching_surface(t, &state)
        .map_or(Polarity::Positive, Polarity::of);
    let tolerance = horizon * 1e-12;
    let mut steps = 0usize;

    while horizon - t > tolerance {
        if steps == MAX_STEPS {
            return Err(ConvergenceError::StepLimitExceeded { steps, step_size });
        }
        steps += 1;

        let size = step_size.min(horizon - t);
        let mut record = take_step(field, tableau, &history, t, &state, size, polarity);
        let mut end_state = record.end_state(tableau);

        if crossed_surface(field, record.end(), &end_state, polarity) {
            let theta = locate_switch(field, tableau, &record, polarity);
            let reduced = size * theta;
            let active = polarity;
            polarity = polarity.flipped();
            trace!("relay switch near t={} (polarity now {:?})", t + reduced, polarity);
            if reduced <= tolerance {
                continue;
            }
            record = take_step(field, tableau, &history, t, &state, reduced, active);
            end_state = record.end_state(tableau);
        }

        if end_state.iter().any(|value| !value.is_finite()) {
            return Err(ConvergenceError::SolverDiverged {
                time: record.end(),
                step_size,
            });
        }

        t = record.end();
        state = end_state;
        history.steps.push(record);
    }

    let last = (dense.points - 1) as f64;
    let times: Vec<f64> = (0..dense.points)
        .map(|i| horizon * i as f64 / last)
        .collect();
    let states = times.iter().map(|&time| history.at(time)).collect();
    Trajectory::new(times, states)
}
