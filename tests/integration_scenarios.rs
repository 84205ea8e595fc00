//! Worked dispatch scenarios with hand-checked results.

mod common;

use approx::assert_relative_eq;

use dispatch_sim::sim::storage::StorageState;
use dispatch_sim::sim::summary::{SummaryAggregator, SummaryInputs};
use dispatch_sim::sim::types::{
    Constraint, DispatchPlan, GeneratorEconomics, HOURS_PER_YEAR, PricingMode, SimConfig,
    TechnologyUnit, UnitKind,
};

#[test]
fn flat_renewable_leaves_flat_shortfall() {
    let load = common::flat_year(100.0);
    let renewables = [common::renewable("Wind", 60.0, common::flat_year(60.0))];
    let (allocation, outcome) = common::dispatch(&load, &renewables, &[], &[]);

    assert!(allocation.shortfall.as_slice().iter().all(|&s| s == 40.0));
    assert_relative_eq!(allocation.to_meet_load[0], 60.0 * HOURS_PER_YEAR as f64);
    assert_eq!(outcome.shortfall, allocation.shortfall);
}

#[test]
fn lossy_discharge_covers_part_of_deficit() {
    let units = [common::storage(
        "Battery",
        50.0,
        Constraint {
            discharge_loss: 0.1,
            initial: 50.0,
            ..Constraint::default()
        },
    )];
    let (_, outcome) = common::dispatch(&[100.0], &[], &units, &["Battery"]);

    let record = outcome.storage_records().next().unwrap();
    assert_relative_eq!(record.discharge[0], 45.0, max_relative = 1e-12);
    assert_relative_eq!(record.losses[0], 5.0, max_relative = 1e-12);
    assert_eq!(record.level[0], 0.0);
    assert_relative_eq!(outcome.shortfall[0], 55.0, max_relative = 1e-12);
}

#[test]
fn generator_floor_runs_through_surplus() {
    let units = [common::generator("Coal", 100.0, 0.2)];
    let renewables = [common::renewable("Solar", 80.0, vec![0.0, 80.0])];
    let (_, outcome) = common::dispatch(&[100.0, 50.0], &renewables, &units, &["Coal"]);

    assert_eq!(outcome.record("Coal").unwrap().output(), &[100.0, 20.0]);
    assert_eq!(outcome.shortfall.as_slice(), &[0.0, -50.0]);
}

#[test]
fn generator_floor_is_withheld_from_storage_ahead_of_it() {
    let units = [
        common::storage("Battery", 100.0, Constraint::default()),
        common::generator("Coal", 100.0, 0.2),
    ];
    let renewables = [common::renewable("Solar", 40.0, vec![0.0, 40.0])];
    let (_, outcome) =
        common::dispatch(&[50.0, 10.0], &renewables, &units, &["Battery", "Coal"]);

    let battery = outcome.storage_records().next().unwrap();
    // The battery sees 30 MW short and 50 MW spare once Coal's 20 MW floor is withheld.
    assert_eq!(battery.charge, [0.0, 50.0]);
    assert_eq!(battery.residual, [50.0, 20.0]);
    assert_eq!(outcome.record("Coal").unwrap().output(), &[50.0, 20.0]);
    assert_eq!(outcome.shortfall.as_slice(), &[0.0, 0.0]);
}

#[test]
fn zero_cost_facility_reports_zero_costs() {
    let econ = GeneratorEconomics::default();
    assert_eq!(econ.pricing_mode("Hydro"), Ok(PricingMode::ZeroCost));

    let config = SimConfig::new(2024, 0.05, 25.0);
    let units = [
        TechnologyUnit::new("Hydro", UnitKind::Renewable, 50.0)
            .with_economics(econ.clone())
            .unwrap(),
        TechnologyUnit::new("Reserve", UnitKind::Generator, 50.0)
            .with_economics(econ)
            .unwrap(),
    ];
    let load = vec![40.0; 24];
    let renewables = [common::renewable("Hydro", 50.0, vec![50.0; 24])];
    let (allocation, outcome) = common::dispatch(&load, &renewables, &units, &["Reserve"]);
    let summary = SummaryAggregator::summarise(&SummaryInputs {
        config: &config,
        units: &units,
        load: &load,
        renewables: &renewables,
        allocation: &allocation,
        underlying: &[],
        outcome: &outcome,
    });

    for row in &summary.units {
        assert_eq!(row.costs.annual_cost, Some(0.0), "{}", row.name);
        assert_eq!(row.costs.lcog, Some(0.0), "{}", row.name);
        assert_eq!(row.costs.lcoe, Some(0.0), "{}", row.name);
        assert_eq!(row.emissions, 0.0);
    }
    assert_eq!(summary.totals.annual_cost, 0.0);
}

#[test]
fn short_deficit_does_not_commit_storage() {
    let units = [common::storage(
        "Pumped Hydro",
        100.0,
        Constraint {
            min_runtime: 3,
            initial: 100.0,
            ..Constraint::default()
        },
    )];
    let load = [90.0, 120.0, 120.0, 90.0, 120.0, 120.0, 120.0, 120.0];
    let renewables = [common::renewable("Wind", 100.0, vec![100.0; 8])];
    let (_, outcome) = common::dispatch(&load, &renewables, &units, &["Pumped Hydro"]);

    let hydro = outcome.storage_records().next().unwrap();
    assert_eq!(hydro.discharge[1], 0.0);
    assert_eq!(hydro.discharge[2], 0.0);
    assert_eq!(hydro.states[1], StorageState::Idle);
    assert_eq!(outcome.shortfall[1], 20.0);
    assert_eq!(outcome.shortfall[2], 20.0);
    // Hours 5..=7 are all short, so hour 4 commits.
    assert_eq!(hydro.discharge[4], 20.0);
    assert_eq!(hydro.states[4], StorageState::Discharging);
}

#[test]
fn warm_up_derates_first_hour_of_each_run() {
    let units = [common::storage(
        "Battery",
        100.0,
        Constraint {
            warm_time: 0.5,
            initial: 100.0,
            ..Constraint::default()
        },
    )];
    let load = [20.0, 20.0, 0.0, 20.0];
    let (_, outcome) = common::dispatch(&load, &[], &units, &["Battery"]);

    let battery = outcome.storage_records().next().unwrap();
    assert_eq!(battery.discharge, [10.0, 20.0, 0.0, 20.0]);
}

#[test]
fn plan_entries_that_cannot_run_are_reported() {
    let units = [
        common::generator("Gas", 100.0, 0.0),
        TechnologyUnit::new("Load", UnitKind::Load, 0.0),
    ];
    let (_, outcome) = common::dispatch(&[50.0], &[], &units, &["Load", "Nuclear", "Gas"]);

    let names: Vec<&str> = outcome.errors.iter().map(|e| e.unit()).collect();
    assert_eq!(names, ["Load", "Nuclear"]);
    assert_eq!(outcome.shortfall.as_slice(), &[0.0]);
    assert!(DispatchPlan::new(["Gas"]).without(&["Gas"]).is_empty());
}
