//! Step-size convergence studies for the dense output of differential-equation solvers.
//!
//! Given an equation with a known closed-form solution, this crate integrates
//! it at many geometrically spaced step sizes, samples the solver's continuous
//! ("dense") reconstruction, and records the worst deviation from the exact
//! solution for every step size. The resulting error-versus-step-size curve
//! reveals the order of the solver's interpolant. It offers tools to
//!
//! - generate logarithmic step-size sweeps (`stepsizes` module),
//! - reduce numerical/analytic sample pairs to a single error (`metric` module),
//! - drive the sweep and estimate the observed order (`convergence` module),
//! - integrate ordinary, delay and relay equations with dense output
//!   (`solver` and `equations` modules),
//! - parse run configurations and persist results (`config` and `sink` modules).
//!
//! # Quick start
//!
//! ```no_run
//! use dense_convergence::config::{build_model, HarnessConfig};
//! use dense_convergence::convergence::run_study;
//! use dense_convergence::sink::{artifact_path, write_curve};
//! use dense_convergence::ConvergenceOptions;
//!
//! let config = HarnessConfig::from_json(
//!     r#"{"t_finish": 10, "h": 0.1, "equation": {"kind": "ode_harmonic", "frequency": 0.5}}"#,
//! )
//! .expect("valid configuration");
//! let model = build_model(&config).expect("known equation");
//!
//! let curve = run_study(&model, config.t_finish, &ConvergenceOptions::default())
//!     .expect("sweep completes");
//! write_curve(&artifact_path("harmonic"), &curve).expect("artifact written");
//! ```

pub mod config;
pub mod convergence;
pub mod equations;
pub mod error;
pub mod metric;
pub mod model;
pub mod options;
pub mod series;
pub mod sink;
pub mod solver;
pub mod stepsizes;
pub mod timing;

pub use convergence::{convergence_errors, estimated_order, run_study};
pub use error::{ConvergenceError, Result};
pub use model::{AnalyticSolution, DifferentialModel};
pub use options::{ConvergenceOptions, DenseOutput, Execution, SweepOptions};
pub use series::{ConvergenceCurve, PairedSeries, Trajectory};
