//! Configuration structures for convergence sweeps.

/// Bounds and resolution of the step-size sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepOptions {
    /// Smallest step size in the sweep.
    pub min_step: f64,
    /// Largest step size in the sweep.
    pub max_step: f64,
    /// Number of geometrically spaced step sizes.
    pub count: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            min_step: 0.01,
            max_step: 1.0,
            count: 100,
        }
    }
}

/// Request for a dense reconstruction sampled at a fixed number of times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DenseOutput {
    /// Number of samples the solver should return.
    pub points: usize,
}

impl DenseOutput {
    /// Requests `points` dense samples.
    pub fn points(points: usize) -> Self {
        Self { points }
    }
}

impl Default for DenseOutput {
    fn default() -> Self {
        Self::points(100)
    }
}

/// How step sizes of a sweep are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Execution {
    /// One step size after another, largest first.
    #[default]
    Sequential,
    /// Every step size independently on the rayon thread pool.
    Parallel,
}

/// Aggregated configuration for a convergence study.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergenceOptions {
    /// Step-size sweep bounds.
    pub sweep: SweepOptions,
    /// Dense-output request forwarded to the solver.
    pub dense_output: DenseOutput,
    /// Index of the analytic solution used as ground truth.
    pub reference_solution: usize,
    /// Scheduling of the sweep.
    pub execution: Execution,
}

impl Default for ConvergenceOptions {
    fn default() -> Self {
        Self {
            sweep: SweepOptions::default(),
            dense_output: DenseOutput::default(),
            reference_solution: 0,
            execution: Execution::Sequential,
        }
    }
}

impl ConvergenceOptions {
    /// Override the sweep bounds while preserving other defaults.
    pub fn with_sweep(mut self, sweep: SweepOptions) -> Self {
        self.sweep = sweep;
        self
    }

    /// Set the number of dense samples requested per step size.
    pub fn with_dense_points(mut self, points: usize) -> Self {
        self.dense_output = DenseOutput::points(points);
        self
    }

    /// Select which analytic solution serves as ground truth.
    pub fn with_reference_solution(mut self, index: usize) -> Self {
        self.reference_solution = index;
        self
    }

    /// Choose sequential or parallel scheduling.
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }
}
