use std::env;

use dense_convergence::config::{build_model, HarnessConfig};
use dense_convergence::convergence::run_study;
use dense_convergence::sink::{artifact_path, write_curve};
use dense_convergence::timing::{HoursMinutesSeconds, RunClock};
use dense_convergence::{ConvergenceError, ConvergenceOptions, Result};

fn main() {
    if let Err(err) = run() {
        eprintln!("rk_interpolation failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let source = file!();
    println!("~~~ {source} is executed ~~~");
    let clock = RunClock::start();

    let mut args = env::args().skip(1);
    let (params, output_name) = match (args.next(), args.next()) {
        (Some(params), Some(output_name)) => (params, output_name),
        _ => {
            return Err(ConvergenceError::Usage {
                reason: "expected `rk_interpolation <json-parameters> <output-name>`".into(),
            })
        }
    };
    println!("~~~  parameters: {params} ~~~");

    let config = HarnessConfig::from_json(&params)?;
    let model = build_model(&config)?;

    let curve = run_study(&model, config.t_finish, &ConvergenceOptions::default())?;
    let path = artifact_path(&output_name);
    write_curve(&path, &curve)?;

    let elapsed = HoursMinutesSeconds::from(clock.elapsed());
    println!("~~~ Computation took {elapsed} (hh:mm:ss) ~~~");
    println!("~~~ {source} is finished ~~~");
    Ok(())
}
