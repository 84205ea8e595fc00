//! Renewable allocation: the shortfall series before any dispatchable unit runs.

use tracing::debug;

use super::shortfall::ShortfallSeries;
use super::types::UnitKind;

/// Hourly output of one non-dispatched unit, multiplier already applied.
#[derive(Debug, Clone)]
pub struct RenewableOutput {
    pub name: String,
    pub kind: UnitKind,
    /// Rated capacity after the multiplier.
    pub capacity: f64,
    pub output: Vec<f64>,
}

impl RenewableOutput {
    pub fn total(&self) -> f64 {
        self.output.iter().sum()
    }

    pub fn max_output(&self) -> f64 {
        self.output.iter().copied().fold(0.0, f64::max)
    }

    pub fn hours_running(&self) -> usize {
        self.output.iter().filter(|&&o| o > 0.0).count()
    }
}

/// Result of allocating renewable output against the load.
#[derive(Debug, Clone)]
pub struct Allocation {
    /// load − Σ renewable output, per hour.
    pub shortfall: ShortfallSeries,
    /// Per source, in input order: energy credited towards the load.
    pub to_meet_load: Vec<f64>,
    /// Renewable energy that actually served the load, per hour.
    pub contribution: Vec<f64>,
}

impl Allocation {
    /// Sum of credited energy over every source.
    pub fn total_to_meet_load(&self) -> f64 {
        self.to_meet_load.iter().sum()
    }
}

/// Builds the initial shortfall series and the to-meet-load credit.
///
/// Sees no dispatchable unit; calling it twice on the same input yields the
/// same result.
pub struct RenewableAllocator;

impl RenewableAllocator {
    /// Allocates `sources` against `load`.
    ///
    /// When supply exceeds load in an hour every source is credited the same
    /// share of its output, `load / supply`.
    ///
    /// # Panics
    ///
    /// Panics if a source's output length differs from the load length.
    pub fn allocate(load: &[f64], sources: &[RenewableOutput]) -> Allocation {
        for source in sources {
            assert_eq!(
                source.output.len(),
                load.len(),
                "series length mismatch for {}",
                source.name
            );
        }

        let shortfall: Vec<f64> = load
            .iter()
            .enumerate()
            .map(|(h, &l)| l - sources.iter().map(|s| s.output[h]).sum::<f64>())
            .collect();

        let shares: Vec<f64> = load
            .iter()
            .zip(&shortfall)
            .map(|(&l, &s)| {
                if s >= 0.0 {
                    1.0
                } else if l == 0.0 {
                    0.0
                } else {
                    l / (l - s)
                }
            })
            .collect();

        let to_meet_load: Vec<f64> = sources
            .iter()
            .map(|src| {
                src.output
                    .iter()
                    .zip(&shares)
                    .map(|(&o, &share)| o * share)
                    .sum()
            })
            .collect();

        let contribution = load
            .iter()
            .zip(&shortfall)
            .map(|(&l, &s)| if s < 0.0 { l } else { l - s })
            .collect();

        let allocation = Allocation {
            shortfall: ShortfallSeries::new(shortfall),
            to_meet_load,
            contribution,
        };
        debug!(
            sources = sources.len(),
            credited = allocation.total_to_meet_load(),
            deficit = allocation.shortfall.deficit_total(),
            surplus = allocation.shortfall.surplus_total(),
            "renewables allocated"
        );
        allocation
    }
}
