//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about = "Merit-order generation and storage dispatch simulator")]
pub struct Args {
    /// Load the scenario from a TOML file.
    #[clap(long, env = "DISPATCH_SCENARIO", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, high_renewables, firmed).
    #[clap(long)]
    pub preset: Option<String>,

    /// Override the scenario's random seed.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Write the hourly arrays to a CSV file.
    #[clap(long)]
    pub hourly_out: Option<PathBuf>,

    /// Write the summary to a JSON file.
    #[clap(long)]
    pub summary_out: Option<PathBuf>,

    /// Do not print the summary table.
    #[clap(long, short)]
    pub quiet: bool,
}

impl Args {
    /// Preset to run when no scenario file is given.
    pub fn preset_name(&self) -> &str {
        self.preset.as_deref().unwrap_or("baseline")
    }
}
