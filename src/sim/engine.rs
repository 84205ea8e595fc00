//! Merit-order dispatch of generators and storage over the shortfall series.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{DispatchError, UnitError};

use super::generator::{GeneratorParams, GeneratorRecord};
use super::shortfall::ShortfallSeries;
use super::storage::{self, StorageParams, StorageRecord};
use super::types::{DispatchPlan, TechnologyUnit, UnitKind};

/// Output of one plan entry.
#[derive(Debug, Clone)]
pub enum DispatchRecord {
    Generator(GeneratorRecord),
    Storage(StorageRecord),
}

impl DispatchRecord {
    pub fn name(&self) -> &str {
        match self {
            Self::Generator(r) => &r.name,
            Self::Storage(r) => &r.name,
        }
    }

    /// Energy delivered to the load each hour.
    pub fn output(&self) -> &[f64] {
        match self {
            Self::Generator(r) => &r.output,
            Self::Storage(r) => &r.discharge,
        }
    }

    /// Shortfall after this unit, withheld floors added back.
    pub fn residual(&self) -> &[f64] {
        match self {
            Self::Generator(r) => &r.residual,
            Self::Storage(r) => &r.residual,
        }
    }

    pub fn total_output(&self) -> f64 {
        self.output().iter().sum()
    }
}

/// Everything the engine produced for one run.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Shortfall after the whole plan.
    pub shortfall: ShortfallSeries,
    /// One record per dispatched unit, in plan order.
    pub records: Vec<DispatchRecord>,
    /// Plan entries that were skipped.
    pub errors: Vec<UnitError>,
}

impl DispatchOutcome {
    pub fn record(&self, name: &str) -> Option<&DispatchRecord> {
        self.records.iter().find(|r| r.name() == name)
    }

    pub fn storage_records(&self) -> impl Iterator<Item = &StorageRecord> {
        self.records.iter().filter_map(|r| match r {
            DispatchRecord::Storage(s) => Some(s),
            DispatchRecord::Generator(_) => None,
        })
    }

    pub fn generator_records(&self) -> impl Iterator<Item = &GeneratorRecord> {
        self.records.iter().filter_map(|r| match r {
            DispatchRecord::Generator(g) => Some(g),
            DispatchRecord::Storage(_) => None,
        })
    }
}

enum PlanEntry<'u> {
    Generator(&'u TechnologyUnit, GeneratorParams),
    Storage(&'u TechnologyUnit, StorageParams),
}

/// Walks the merit order over an owned shortfall buffer.
///
/// Pure with respect to its inputs: units are only read, and the shortfall
/// buffer handed to [`DispatchEngine::run`] is returned in the outcome.
pub struct DispatchEngine<'u> {
    units: &'u [TechnologyUnit],
}

impl<'u> DispatchEngine<'u> {
    pub fn new(units: &'u [TechnologyUnit]) -> Self {
        Self { units }
    }

    /// Resolves one plan name. `Ok(None)` means a zero-capacity unit.
    fn resolve(&self, name: &str) -> Result<Option<PlanEntry<'u>>, UnitError> {
        let unit = self
            .units
            .iter()
            .find(|u| u.name == name)
            .ok_or_else(|| UnitError::UnknownUnit(name.to_string()))?;
        if !unit.kind.is_dispatchable() {
            return Err(UnitError::NotDispatchable {
                name: unit.name.clone(),
                kind: unit.kind.to_string(),
            });
        }
        let rated = unit.rated_capacity();
        if !rated.is_finite() || rated < 0.0 {
            return Err(UnitError::MissingCapacity(unit.name.clone()));
        }
        if rated == 0.0 {
            return Ok(None);
        }
        let entry = match unit.kind {
            UnitKind::Generator => PlanEntry::Generator(unit, GeneratorParams::from_unit(unit)?),
            _ => PlanEntry::Storage(unit, StorageParams::from_unit(unit)?),
        };
        Ok(Some(entry))
    }

    /// Runs the plan against `shortfall`.
    ///
    /// Every generator floor is withheld from all hours before the first
    /// turn and restored at that generator's own turn.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvariantViolation`] if a storage unit leaves
    /// its bounds. Plan entries that cannot be resolved do not fail the run;
    /// they are listed in [`DispatchOutcome::errors`].
    pub fn run(
        &self,
        mut shortfall: ShortfallSeries,
        plan: &DispatchPlan,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut errors = Vec::new();
        let mut entries = Vec::with_capacity(plan.len());
        let mut seen = HashSet::new();

        for name in plan.iter() {
            if !seen.insert(name) {
                warn!(unit = name, "duplicate plan entry skipped");
                errors.push(UnitError::DuplicateEntry(name.to_string()));
                continue;
            }
            match self.resolve(name) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => debug!(unit = name, "zero-capacity unit skipped"),
                Err(e) => {
                    warn!(unit = name, error = %e, "plan entry skipped");
                    errors.push(e);
                }
            }
        }

        let mut withheld = 0.0;
        for entry in &entries {
            if let PlanEntry::Generator(_, params) = entry {
                if params.floor > 0.0 {
                    shortfall.shift(-params.floor);
                    withheld += params.floor;
                }
            }
        }
        if withheld > 0.0 {
            debug!(withheld, "generator floors withheld");
        }

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                PlanEntry::Generator(unit, params) => {
                    if params.floor > 0.0 {
                        shortfall.shift(params.floor);
                        withheld -= params.floor;
                    }
                    let record = params.dispatch(&unit.name, &mut shortfall, withheld);
                    records.push(DispatchRecord::Generator(record));
                }
                PlanEntry::Storage(unit, params) => {
                    let record = storage::simulate(&unit.name, &params, &mut shortfall, withheld)?;
                    records.push(DispatchRecord::Storage(record));
                }
            }
        }

        info!(
            dispatched = records.len(),
            skipped = errors.len(),
            unmet = shortfall.deficit_total(),
            surplus = shortfall.surplus_total(),
            "dispatch complete"
        );
        Ok(DispatchOutcome {
            shortfall,
            records,
            errors,
        })
    }
}
