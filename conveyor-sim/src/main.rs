//! Conveyor simulator - timed bounded-buffer producer/consumer runs.
//!
//! Usage: conveyor-sim <config-file> [output-file]
//!
//! Config file: three whitespace-separated integers — duration in
//! seconds, producer count, consumer count. Each consumed item is
//! printed on its own line; `RUST_LOG=conveyor=debug` surfaces the
//! per-task lifecycle as well.

use conveyor::{report, RunConfig};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Conveyor Simulator");
        eprintln!("==================");
        eprintln!("Usage: conveyor-sim <config-file> [output-file]");
        eprintln!();
        eprintln!("Config: <duration-seconds> <producers> <consumers>");
        process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: &[String]) -> conveyor::Result<()> {
    let config = RunConfig::from_file(&args[1])?;
    let result = conveyor::run_with_sink(&config, |item| println!("{}", item))?;

    let output = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| report::default_report_path(config.duration));
    report::write_report(&output, &result)?;
    println!(
        "turnaround time: {:.3} seconds (report: {})",
        result.elapsed.as_secs_f64(),
        output.display()
    );
    Ok(())
}
