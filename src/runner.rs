//! Scenario construction and the end-to-end run: series, allocation, dispatch, summary.

use tracing::{debug, info, warn};

use crate::config::{ConfigError, ScenarioConfig, UnitConfig};
use crate::error::{DispatchError, RunError, UnitError};
use crate::profiles;
use crate::series::HourlySeriesStore;
use crate::sim::engine::{DispatchEngine, DispatchOutcome};
use crate::sim::renewable::{Allocation, RenewableAllocator, RenewableOutput};
use crate::sim::summary::{Summary, SummaryAggregator, SummaryInputs};
use crate::sim::types::{DispatchPlan, SimConfig, TechnologyUnit, UnitKind};

/// Seed offset between consecutive synthetic profiles so units do not share noise.
const PROFILE_SEED_STRIDE: u64 = 57;

/// A scenario ready to run: units resolved, series loaded.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: SimConfig,
    pub units: Vec<TechnologyUnit>,
    pub plan: DispatchPlan,
    pub store: HourlySeriesStore,
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub config: SimConfig,
    pub units: Vec<TechnologyUnit>,
    /// Load per hour, multiplier applied.
    pub load: Vec<f64>,
    pub renewables: Vec<RenewableOutput>,
    pub underlying: Vec<RenewableOutput>,
    pub allocation: Allocation,
    pub outcome: DispatchOutcome,
    pub summary: Summary,
    /// Units excluded while building the scenario, then plan entries the engine skipped.
    pub unit_errors: Vec<UnitError>,
}

impl RunOutput {
    /// Renewable output summed over every source, per hour.
    pub fn renewable_total(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.load.len()];
        for source in &self.renewables {
            for (t, v) in total.iter_mut().zip(&source.output) {
                *t += v;
            }
        }
        total
    }
}

fn profile_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add(PROFILE_SEED_STRIDE.wrapping_mul(index as u64 + 1))
}

/// Loads the series file, or starts empty, then fills every missing
/// series that has a synthetic profile.
fn load_series(cfg: &ScenarioConfig) -> Result<HourlySeriesStore, RunError> {
    let mut store = match &cfg.simulation.series {
        Some(path) => {
            info!(path = %path.display(), "loading series file");
            HourlySeriesStore::from_csv_path(path)?
        }
        None => HourlySeriesStore::new(),
    };
    for (i, unit) in cfg.units.iter().enumerate() {
        let Some(profile) = &unit.profile else {
            continue;
        };
        if store.index_of(unit.series_name()).is_some() {
            continue;
        }
        let seed = profile_seed(cfg.simulation.seed, i);
        let values = profiles::year_series(profile, unit.capacity, seed);
        store.insert(unit.series_name(), values)?;
        debug!(unit = %unit.name, seed, "synthetic profile generated");
    }
    Ok(store)
}

fn build_unit(
    unit: &UnitConfig,
    kind: UnitKind,
    store: &HourlySeriesStore,
) -> Result<TechnologyUnit, UnitError> {
    let mut built = TechnologyUnit::new(unit.name.as_str(), kind, unit.capacity)
        .with_multiplier(unit.multiplier)
        .with_economics(unit.economics.to_economics())?
        .with_constraint(unit.constraint.to_constraint())?;
    if let Some(zone) = &unit.zone {
        built = built.with_zone(zone.as_str());
    }
    match store.index_of(unit.series_name()) {
        Some(index) => built = built.with_series(index),
        // A load without a series fails the whole run later on.
        None if kind.needs_series() && kind != UnitKind::Load => {
            return Err(UnitError::MissingSeries {
                name: unit.name.clone(),
                series: unit.series_name().to_string(),
            });
        }
        None => {}
    }
    Ok(built)
}

/// Resolves a scenario configuration into runnable units.
///
/// Units whose economics, limits, or series are unusable are left out and
/// returned as [`UnitError`]s; their names are dropped from the plan.
///
/// # Errors
///
/// Returns [`RunError::Config`] for invalid run settings or an unknown unit
/// kind and [`RunError::Series`] if the series file cannot be loaded.
pub fn build_scenario(cfg: &ScenarioConfig) -> Result<(Scenario, Vec<UnitError>), RunError> {
    let config = cfg.sim_config()?;
    let store = load_series(cfg)?;

    let mut units = Vec::with_capacity(cfg.units.len());
    let mut errors = Vec::new();
    for (i, unit) in cfg.units.iter().enumerate() {
        let kind = UnitKind::from_name(&unit.kind).ok_or_else(|| {
            ConfigError::new(
                format!("unit[{i}].kind"),
                format!("unknown unit kind \"{}\"", unit.kind),
            )
        })?;
        match build_unit(unit, kind, &store) {
            Ok(built) => units.push(built),
            Err(e) => {
                warn!(unit = %unit.name, error = %e, "unit excluded");
                errors.push(e);
            }
        }
    }

    let excluded: Vec<&str> = errors.iter().map(UnitError::unit).collect();
    let plan = cfg.dispatch.plan().without(&excluded);
    info!(
        units = units.len(),
        excluded = errors.len(),
        plan = plan.len(),
        "scenario built"
    );
    Ok((
        Scenario {
            config,
            units,
            plan,
            store,
        },
        errors,
    ))
}

fn outputs_of(scenario: &Scenario, kind: UnitKind) -> Vec<RenewableOutput> {
    scenario
        .units
        .iter()
        .filter(|u| u.kind == kind && u.is_active())
        .filter_map(|u| {
            u.series.map(|index| RenewableOutput {
                name: u.name.clone(),
                kind,
                capacity: u.rated_capacity(),
                output: scenario.store.scaled(index, u.multiplier),
            })
        })
        .collect()
}

/// Runs allocation, dispatch, and aggregation over a built scenario.
///
/// # Errors
///
/// Returns [`DispatchError::MissingLoad`] or
/// [`DispatchError::MissingLoadSeries`] when the load cannot be read, and
/// propagates any [`DispatchError::InvariantViolation`] from the engine.
pub fn simulate(scenario: &Scenario) -> Result<RunOutput, DispatchError> {
    let load_unit = scenario
        .units
        .iter()
        .find(|u| u.kind == UnitKind::Load)
        .ok_or(DispatchError::MissingLoad)?;
    let load_index = load_unit
        .series
        .ok_or_else(|| DispatchError::MissingLoadSeries(load_unit.name.clone()))?;
    let load = scenario.store.scaled(load_index, load_unit.multiplier);

    let renewables = outputs_of(scenario, UnitKind::Renewable);
    let underlying = outputs_of(scenario, UnitKind::UnderlyingLoad);
    let allocation = RenewableAllocator::allocate(&load, &renewables);

    let engine = DispatchEngine::new(&scenario.units);
    let outcome = engine.run(allocation.shortfall.clone(), &scenario.plan)?;

    let summary = SummaryAggregator::summarise(&SummaryInputs {
        config: &scenario.config,
        units: &scenario.units,
        load: &load,
        renewables: &renewables,
        allocation: &allocation,
        underlying: &underlying,
        outcome: &outcome,
    });

    let unit_errors = outcome.errors.clone();
    Ok(RunOutput {
        config: scenario.config.clone(),
        units: scenario.units.clone(),
        load,
        renewables,
        underlying,
        allocation,
        outcome,
        summary,
        unit_errors,
    })
}

/// Builds and runs a scenario in one go.
///
/// # Errors
///
/// See [`build_scenario`] and [`simulate`].
pub fn run_scenario(cfg: &ScenarioConfig) -> Result<RunOutput, RunError> {
    let (scenario, mut errors) = build_scenario(cfg)?;
    let mut output = simulate(&scenario)?;
    errors.append(&mut output.unit_errors);
    output.unit_errors = errors;
    Ok(output)
}
