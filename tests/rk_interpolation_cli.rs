use std::fs;
use std::path::PathBuf;
use std::process::Command;

use dense_convergence::sink::read_curve;

fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "dense-convergence-cli-{label}-{}",
        std::process::id()
    ))
}

#[test]
fn missing_arguments_exit_with_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_rk_interpolation"))
        .arg(r#"{"t_finish": 1, "h": 0.1, "equation": {"kind": "relay"}}"#)
        .output()
        .expect("failed to execute rk_interpolation");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("<json-parameters> <output-name>"), "{stderr}");
}

#[test]
fn invalid_configuration_exits_with_failure() {
    let output = Command::new(env!("CARGO_BIN_EXE_rk_interpolation"))
        .arg(r#"{"t_finish": 1}"#)
        .arg("broken")
        .output()
        .expect("failed to execute rk_interpolation");

    assert_eq!(output.status.code(), Some(1));
}

/// A full run echoes its parameters and writes `../output/bin/<name>.bin`
/// relative to the working directory.
#[test]
fn run_writes_the_convergence_artifact() {
    let root = scratch_dir("run");
    let workdir = root.join("work");
    fs::create_dir_all(&workdir).unwrap();
    let params = r#"{"t_finish": 1, "h": 0.1, "equation": {"kind": "ode_linear", "rate": -1}}"#;

    let output = Command::new(env!("CARGO_BIN_EXE_rk_interpolation"))
        .arg(params)
        .arg("ode_lin")
        .current_dir(&workdir)
        .output()
        .expect("failed to execute rk_interpolation");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stdout: {stdout}\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains(params));
    assert!(stdout.contains("(hh:mm:ss)"));
    assert!(stdout.contains("is finished"));

    let curve = read_curve(&root.join("output").join("bin").join("ode_lin.bin")).unwrap();
    assert_eq!(curve.len(), 100);
    assert_eq!(curve.step_sizes()[0], 0.01);
    assert_eq!(curve.step_sizes()[99], 1.0);
    assert!(curve.errors().iter().all(|e| e.is_finite() && *e >= 0.0));

    fs::remove_dir_all(&root).unwrap();
}
