use thiserror::Error;

/// Unified error type for convergence studies.
#[derive(Debug, Error)]
pub enum ConvergenceError {
    /// Raised when the bounds of a step-size sweep are not positive and ordered.
    #[error("step-size bounds must satisfy 0 < lower <= upper, found lower={lower} upper={upper}")]
    InvalidStepRange { lower: f64, upper: f64 },

    /// Raised when a scalar argument is not positive and finite.
    #[error("{context} must be positive and finite, found {value}")]
    InvalidArgument {
        /// Human-readable name of the offending argument.
        context: &'static str,
        /// The value that was supplied.
        value: f64,
    },

    /// Raised when two sequences that must stay aligned differ in length.
    #[error("length mismatch in {context}: expected {expected} but found {found}")]
    LengthMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// Length of the leading sequence.
        expected: usize,
        /// Length of the sequence that should have matched it.
        found: usize,
    },

    /// Raised when the configuration payload cannot be parsed.
    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Raised when an equation variant rejects its parameters.
    #[error("cannot construct `{equation}` model: {reason}")]
    InvalidModel {
        equation: &'static str,
        reason: String,
    },

    /// Raised when the requested reference solution does not exist.
    #[error("analytic solution {index} requested but the model provides {available}")]
    MissingAnalyticSolution { index: usize, available: usize },

    /// Raised when the numerical state stops being finite.
    #[error("solver diverged at t={time} with step size {step_size}")]
    SolverDiverged { time: f64, step_size: f64 },

    /// Raised when an integration needs more steps than the solver allows.
    #[error("integration with step size {step_size} exceeded {steps} steps")]
    StepLimitExceeded { steps: usize, step_size: f64 },

    /// Raised when the result artifact cannot be written or read.
    #[error("result artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a result artifact does not decode.
    #[error("corrupt result artifact: {reason}")]
    CorruptArtifact { reason: &'static str },

    /// Raised when the executable is invoked with the wrong arguments.
    #[error("usage error: {reason}")]
    Usage { reason: String },
}

impl ConvergenceError {
    /// Helper to format a [`LengthMismatch`](ConvergenceError::LengthMismatch) error.
    pub fn length_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::LengthMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper to reject a scalar that must be positive and finite.
    pub fn invalid_argument(context: &'static str, value: f64) -> Self {
        Self::InvalidArgument { context, value }
    }

    /// Helper for model factories rejecting their parameters.
    pub fn invalid_model<S: Into<String>>(equation: &'static str, reason: S) -> Self {
        Self::InvalidModel {
            equation,
            reason: reason.into(),
        }
    }
}

/// Checks that `value` is strictly positive and finite.
pub(crate) fn ensure_positive(context: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConvergenceError::invalid_argument(context, value))
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ConvergenceError>;
