//! Parsing of the harness configuration payload and model construction.

use log::info;
use nalgebra::DVector;
use serde::Deserialize;

use crate::equations::{HarmonicOscillator, LinearDde, LinearOde, RelayOscillator};
use crate::error::{ensure_positive, Result};
use crate::model::DifferentialModel;
use crate::solver::Method;

/// Equation variant and its parameters, tagged by `kind`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EquationConfig {
    /// `x' = rate · x`.
    OdeLinear { rate: f64 },
    /// `x'' = -frequency² · x`.
    OdeHarmonic { frequency: f64 },
    /// Linear delay equation with solution `sin(frequency · t)`.
    DdeLinear { frequency: f64, delay: f64 },
    /// `x'' = -gain · sign(x)`.
    Relay {
        #[serde(default = "default_relay_gain")]
        gain: f64,
    },
}

fn default_relay_gain() -> f64 {
    2.0
}

impl EquationConfig {
    /// Configuration name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OdeLinear { .. } => "ode_linear",
            Self::OdeHarmonic { .. } => "ode_harmonic",
            Self::DdeLinear { .. } => "dde_linear",
            Self::Relay { .. } => "relay",
        }
    }
}

/// Parsed configuration of one harness run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HarnessConfig {
    /// Integration horizon; every solve covers `[0, t_finish]`.
    pub t_finish: f64,
    /// Nominal step size. Validated but not used to drive the sweep, which
    /// always spans its own fixed range.
    pub h: f64,
    /// Runge–Kutta scheme used by the equation model.
    #[serde(default)]
    pub method: Method,
    /// Equation variant to construct.
    pub equation: EquationConfig,
}

impl HarnessConfig {
    /// Parses and validates a JSON payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        ensure_positive("t_finish", config.t_finish)?;
        ensure_positive("h", config.h)?;
        Ok(config)
    }
}

/// Equation model behind the common capability interface.
pub type BoxedModel = Box<dyn DifferentialModel<State = DVector<f64>>>;

/// Builds the equation model a configuration asks for.
pub fn build_model(config: &HarnessConfig) -> Result<BoxedModel> {
    let tableau = config.method.tableau();
    info!(
        "building {} model with {} (order {}, dense output order {})",
        config.equation.name(),
        tableau.name(),
        tableau.order(),
        tableau.interpolant_order()
    );
    let model: BoxedModel = match config.equation {
        EquationConfig::OdeLinear { rate } => Box::new(LinearOde::new(rate, tableau)?),
        EquationConfig::OdeHarmonic { frequency } => {
            Box::new(HarmonicOscillator::new(frequency, tableau)?)
        }
        EquationConfig::DdeLinear { frequency, delay } => {
            Box::new(LinearDde::new(frequency, delay, tableau)?)
        }
        EquationConfig::Relay { gain } => Box::new(RelayOscillator::new(gain, tableau)?),
    };
    Ok(model)
}
