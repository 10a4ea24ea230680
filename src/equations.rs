//! Test equations with known closed-form solutions.
//!
//! Each model pairs a right-hand side with the Runge–Kutta tableau used to
//! integrate it and a non-empty list of exact solutions. The first solution
//! is the one convergence studies compare against by default.

use nalgebra::DVector;

use crate::error::{ConvergenceError, Result};
use crate::model::{AnalyticSolution, ClosedForm, DifferentialModel};
use crate::options::DenseOutput;
use crate::series::Trajectory;
use crate::solver::{integrate, ButcherTableau, History, Polarity, VectorField};

type Solutions = Vec<Box<dyn AnalyticSolution<DVector<f64>>>>;

fn closed_form<F>(function: F) -> Box<dyn AnalyticSolution<DVector<f64>>>
where
    F: Fn(f64) -> DVector<f64> + Send + Sync + 'static,
{
    Box::new(ClosedForm::new(function))
}

fn require_finite(equation: &'static str, name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConvergenceError::invalid_model(
            equation,
            format!("{name} must be finite, found {value}"),
        ))
    }
}

fn require_positive(equation: &'static str, name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConvergenceError::invalid_model(
            equation,
            format!("{name} must be positive and finite, found {value}"),
        ))
    }
}

macro_rules! delegate_solution {
    () => {
        type State = DVector<f64>;

        fn solution(
            &self,
            step_size: f64,
            horizon: f64,
            reference: &dyn AnalyticSolution<DVector<f64>>,
            dense: DenseOutput,
        ) -> Result<Trajectory> {
            integrate(self, &self.tableau, step_size, horizon, reference, dense)
        }

        fn analytic_solutions(&self) -> &[Box<dyn AnalyticSolution<DVector<f64>>>] {
            &self.solutions
        }
    };
}

/// Scalar exponential growth or decay: `x' = rate · x`.
pub struct LinearOde {
    rate: f64,
    tableau: ButcherTableau,
    solutions: Solutions,
}

impl LinearOde {
    pub fn new(rate: f64, tableau: ButcherTableau) -> Result<Self> {
        let rate = require_finite("ode_linear", "rate", rate)?;
        let solutions = vec![closed_form(move |t| {
            DVector::from_element(1, (rate * t).exp())
        })];
        Ok(Self {
            rate,
            tableau,
            solutions,
        })
    }
}

impl VectorField for LinearOde {
    fn dimension(&self) -> usize {
        1
    }

    fn derivative(
        &self,
        _t: f64,
        state: &DVector<f64>,
        _past: &History<'_>,
        _polarity: Polarity,
    ) -> DVector<f64> {
        state * self.rate
    }
}

impl DifferentialModel for LinearOde {
    delegate_solution!();
}

/// Harmonic oscillator written as a first-order system: `x' = v`, `v' = -k² x`.
pub struct HarmonicOscillator {
    frequency: f64,
    tableau: ButcherTableau,
    solutions: Solutions,
}

impl HarmonicOscillator {
    pub fn new(frequency: f64, tableau: ButcherTableau) -> Result<Self> {
        let k = require_positive("ode_harmonic", "frequency", frequency)?;
        let solutions = vec![
            closed_form(move |t| DVector::from_vec(vec![(k * t).sin(), k * (k * t).cos()])),
            closed_form(move |t| DVector::from_vec(vec![(k * t).cos(), -k * (k * t).sin()])),
        ];
        Ok(Self {
            frequency: k,
            tableau,
            solutions,
        })
    }
}

impl VectorField for HarmonicOscillator {
    fn dimension(&self) -> usize {
        2
    }

    fn derivative(
        &self,
        _t: f64,
        state: &DVector<f64>,
        _past: &History<'_>,
        _polarity: Polarity,
    ) -> DVector<f64> {
        let k2 = self.frequency * self.frequency;
        DVector::from_vec(vec![state[1], -k2 * state[0]])
    }
}

impl DifferentialModel for HarmonicOscillator {
    delegate_solution!();
}

/// Linear delay equation `x' = a x(t) + b x(t - τ)` tuned so that `sin(kt)`
/// and `cos(kt)` are exact solutions: `a = k cot(kτ)`, `b = -k / sin(kτ)`.
pub struct LinearDde {
    delay: f64,
    a: f64,
    b: f64,
    tableau: ButcherTableau,
    solutions: Solutions,
}

impl LinearDde {
    pub fn new(frequency: f64, delay: f64, tableau: ButcherTableau) -> Result<Self> {
        let k = require_positive("dde_linear", "frequency", frequency)?;
        let tau = require_positive("dde_linear", "delay", delay)?;
        let sine = (k * tau).sin();
        if sine.abs() < 1e-12 {
            return Err(ConvergenceError::invalid_model(
                "dde_linear",
                format!("sin(frequency * delay) vanishes for frequency={k} delay={tau}"),
            ));
        }
        let solutions = vec![
            closed_form(move |t| DVector::from_element(1, (k * t).sin())),
            closed_form(move |t| DVector::from_element(1, (k * t).cos())),
        ];
        Ok(Self {
            delay: tau,
            a: k * (k * tau).cos() / sine,
            b: -k / sine,
            tableau,
            solutions,
        })
    }
}

impl VectorField for LinearDde {
    fn dimension(&self) -> usize {
        1
    }

    fn derivative(
        &self,
        t: f64,
        state: &DVector<f64>,
        past: &History<'_>,
        _polarity: Polarity,
    ) -> DVector<f64> {
        let delayed = past.at(t - self.delay);
        DVector::from_element(1, self.a * state[0] + self.b * delayed[0])
    }
}

impl DifferentialModel for LinearDde {
    delegate_solution!();
}

/// Relay oscillator `x'' = -g · sign(x)`, switching whenever `x` crosses zero.
///
/// Starting from `x = g/8, v = 0` the exact solution is a chain of parabolic
/// arcs crossing zero at `t = 0.5, 1.5, 2.5, …`.
pub struct RelayOscillator {
    gain: f64,
    tableau: ButcherTableau,
    solutions: Solutions,
}

/// Unit-gain parabolic profile `p(s)` and its derivative.
fn relay_profile(s: f64) -> (f64, f64) {
    let arc = s.floor();
    let u = s - arc;
    let orientation = if arc.rem_euclid(2.0) == 0.0 { -1.0 } else { 1.0 };
    (u * (u - 1.0) * orientation, (2.0 * u - 1.0) * orientation)
}

impl RelayOscillator {
    pub fn new(gain: f64, tableau: ButcherTableau) -> Result<Self> {
        let g = require_positive("relay", "gain", gain)?;
        let solutions = vec![closed_form(move |t| {
            let (position, velocity) = relay_profile(t + 0.5);
            DVector::from_vec(vec![0.5 * g * position, 0.5 * g * velocity])
        })];
        Ok(Self {
            gain: g,
            tableau,
            solutions,
        })
    }
}

impl VectorField for RelayOscillator {
    fn dimension(&self) -> usize {
        2
    }

    fn derivative(
        &self,
        _t: f64,
        state: &DVector<f64>,
        _past: &History<'_>,
        polarity: Polarity,
    ) -> DVector<f64> {
        DVector::from_vec(vec![state[1], -self.gain * polarity.sign()])
    }

    fn switching_surface(&self, _t: f64, state: &DVector<f64>) -> Option<f64> {
        Some(state[0])
    }
}

impl DifferentialModel for RelayOscillator {
    delegate_solution!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::max_deviation;
    use approx::assert_relative_eq;

    fn reference_error<M>(model: &M, step_size: f64, horizon: f64) -> f64
    where
        M: DifferentialModel<State = DVector<f64>>,
    {
        let reference = model.analytic_solutions()[0].as_ref();
        let trajectory = model
            .solution(step_size, horizon, reference, DenseOutput::points(200))
            .unwrap();
        let exact = reference.evaluate_series(trajectory.times());
        max_deviation(trajectory.states(), &exact).unwrap()
    }

    #[test]
    fn linear_ode_tracks_exponential() {
        let model = LinearOde::new(-1.0, ButcherTableau::classic4()).unwrap();
        assert!(reference_error(&model, 0.1, 5.0) < 1e-5);
    }

    #[test]
    fn harmonic_solutions_satisfy_initial_relation() {
        let model = HarmonicOscillator::new(0.5, ButcherTableau::classic4()).unwrap();
        assert_eq!(model.analytic_solutions().len(), 2);
        let second = model.analytic_solutions()[1].evaluate(0.0);
        assert_relative_eq!(second[0], 1.0);
        assert_relative_eq!(second[1], 0.0);
        assert!(reference_error(&model, 0.1, 10.0) < 1e-5);
    }

    #[test]
    fn delay_equation_converges_with_step_size() {
        let model = LinearDde::new(1.0, 1.0, ButcherTableau::classic4()).unwrap();
        let coarse = reference_error(&model, 0.1, 5.0);
        let fine = reference_error(&model, 0.05, 5.0);
        assert!(coarse < 1e-3, "coarse={coarse}");
        assert!(fine < coarse / 4.0, "coarse={coarse} fine={fine}");
    }

    #[test]
    fn delay_equation_rejects_degenerate_parameters() {
        let result = LinearDde::new(std::f64::consts::PI, 1.0, ButcherTableau::euler());
        assert!(matches!(result, Err(ConvergenceError::InvalidModel { .. })));
    }

    #[test]
    fn relay_profile_switches_at_half_integers() {
        let model = RelayOscillator::new(2.0, ButcherTableau::classic4()).unwrap();
        let exact = &model.analytic_solutions()[0];
        assert_relative_eq!(exact.evaluate(0.0)[0], 0.25);
        assert_relative_eq!(exact.evaluate(0.0)[1], 0.0);
        assert_relative_eq!(exact.evaluate(0.5)[0], 0.0, epsilon = 1e-15);
        assert!(exact.evaluate(1.0)[0] < 0.0);
        assert!(exact.evaluate(2.0)[0] > 0.0);
    }

    #[test]
    fn relay_switches_are_located_accurately() {
        let model = RelayOscillator::new(2.0, ButcherTableau::classic4()).unwrap();
        let error = reference_error(&model, 0.3, 4.0);
        assert!(error < 1e-8, "error={error}");
    }

    #[test]
    fn rejects_non_positive_parameters() {
        assert!(HarmonicOscillator::new(0.0, ButcherTableau::heun()).is_err());
        assert!(RelayOscillator::new(-1.0, ButcherTableau::heun()).is_err());
        assert!(LinearOde::new(f64::NAN, ButcherTableau::heun()).is_err());
    }
}
