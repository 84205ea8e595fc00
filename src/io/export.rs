//! CSV export of the hourly arrays and JSON export of the summary.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::runner::RunOutput;
use crate::sim::engine::DispatchRecord;
use crate::sim::summary::{Summary, period_label};

/// Leading columns of the hourly CSV, before any per-unit column.
const LEADING_COLUMNS: &[&str] = &["hour", "period", "load", "renewables", "after_renewables"];

fn cell(value: f64) -> String {
    // `+ 0.0` turns -0.0 into 0.0.
    format!("{:.4}", value + 0.0)
}

/// Column header of the hourly CSV for one run.
///
/// Renewable and underlying-load sources get one output column each;
/// generators get `output` and `residual`; storage gets `charge`,
/// `discharge`, `losses`, `level`, and `residual`. The last column is the
/// final shortfall.
pub fn hourly_header(output: &RunOutput) -> Vec<String> {
    let mut header: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    for source in output.renewables.iter().chain(&output.underlying) {
        header.push(source.name.clone());
    }
    for record in &output.outcome.records {
        let suffixes: &[&str] = match record {
            DispatchRecord::Generator(_) => &["output", "residual"],
            DispatchRecord::Storage(_) => &["charge", "discharge", "losses", "level", "residual"],
        };
        for suffix in suffixes {
            header.push(format!("{} {suffix}", record.name()));
        }
    }
    header.push("shortfall".to_string());
    header
}

/// Exports the hourly arrays of a run to a CSV file at the given path.
///
/// # Arguments
///
/// * `output` - Complete run output
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_hourly_csv(output: &RunOutput, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_hourly_csv(output, buf)
}

/// Writes the hourly arrays of a run as CSV to any writer.
///
/// Shortfall and residual columns follow the run's shortfall sign
/// convention. Produces identical bytes for identical runs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_hourly_csv(output: &RunOutput, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(hourly_header(output))?;

    let sign = output.config.shortfall_sign.factor();
    let renewables = output.renewable_total();
    let after_renewables = output.allocation.shortfall.as_slice();
    let shortfall = output.outcome.shortfall.as_slice();

    let mut row = Vec::new();
    for hour in 0..output.load.len() {
        row.clear();
        row.push(hour.to_string());
        row.push(period_label(hour));
        row.push(cell(output.load[hour]));
        row.push(cell(renewables[hour]));
        row.push(cell(sign * after_renewables[hour]));
        for source in output.renewables.iter().chain(&output.underlying) {
            row.push(cell(source.output[hour]));
        }
        for record in &output.outcome.records {
            match record {
                DispatchRecord::Generator(g) => {
                    row.push(cell(g.output[hour]));
                    row.push(cell(sign * g.residual[hour]));
                }
                DispatchRecord::Storage(s) => {
                    row.push(cell(s.charge[hour]));
                    row.push(cell(s.discharge[hour]));
                    row.push(cell(s.losses[hour]));
                    row.push(cell(s.level[hour]));
                    row.push(cell(sign * s.residual[hour]));
                }
            }
        }
        row.push(cell(sign * shortfall[hour]));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the run summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization, or writing fails.
pub fn export_summary_json(summary: &Summary, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_summary_json(summary, io::BufWriter::new(file))
}

/// Writes the run summary as pretty-printed JSON to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_summary_json(summary: &Summary, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    writer.flush()
}
