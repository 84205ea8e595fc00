//! Dispatch simulator entry point: CLI wiring, scenario loading, and export.

use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dispatch_sim::cli::Args;
use dispatch_sim::config::ScenarioConfig;
use dispatch_sim::io::export::{export_hourly_csv, export_summary_json};
use dispatch_sim::runner::run_scenario;

fn load_scenario(args: &Args) -> ScenarioConfig {
    let loaded = match &args.scenario {
        Some(path) => ScenarioConfig::from_toml_file(path),
        None => ScenarioConfig::from_preset(args.preset_name()),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    })
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut scenario = load_scenario(&args);

    if let Some(seed) = args.seed {
        scenario.simulation.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let output = match run_scenario(&scenario) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    for e in &output.unit_errors {
        eprintln!("warning: {e}");
    }

    if !args.quiet {
        println!("{}", output.summary);
    }

    if let Some(path) = &args.hourly_out {
        if let Err(e) = export_hourly_csv(&output, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "hourly arrays written");
    }

    if let Some(path) = &args.summary_out {
        if let Err(e) = export_summary_json(&output.summary, path) {
            eprintln!("error: failed to write summary: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "summary written");
    }
}
