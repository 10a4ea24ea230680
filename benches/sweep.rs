use criterion::{criterion_group, criterion_main, Criterion};
use dense_convergence::config::{build_model, HarnessConfig};
use dense_convergence::stepsizes::geometric_steps;
use dense_convergence::{convergence_errors, ConvergenceOptions, Execution};

fn harmonic_config() -> HarnessConfig {
    HarnessConfig::from_json(
        r#"{"t_finish": 20, "h": 0.1, "equation": {"kind": "ode_harmonic", "frequency": 0.5}}"#,
    )
    .expect("valid benchmark configuration")
}

fn bench_sweep(c: &mut Criterion) {
    let config = harmonic_config();
    let model = build_model(&config).expect("harmonic model");
    let steps = geometric_steps(0.01, 1.0, 25).expect("valid sweep");

    for (label, execution) in [
        ("sweep_harmonic_rk4_sequential", Execution::Sequential),
        ("sweep_harmonic_rk4_parallel", Execution::Parallel),
    ] {
        let options = ConvergenceOptions::default().with_execution(execution);
        c.bench_function(label, |b| {
            b.iter(|| convergence_errors(&model, config.t_finish, &steps, &options))
        });
    }
}

fn bench_delay_solve(c: &mut Criterion) {
    let config = HarnessConfig::from_json(
        r#"{"t_finish": 10, "h": 0.1, "equation": {"kind": "dde_linear", "frequency": 1, "delay": 1}}"#,
    )
    .expect("valid benchmark configuration");
    let model = build_model(&config).expect("delay model");
    let options = ConvergenceOptions::default();

    c.bench_function("dense_error_dde_h0.01", |b| {
        b.iter(|| convergence_errors(&model, config.t_finish, &[0.01], &options))
    });
}

criterion_group!(benches, bench_sweep, bench_delay_solve);
criterion_main!(benches);
