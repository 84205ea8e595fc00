//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use dispatch_sim::sim::engine::{DispatchEngine, DispatchOutcome};
use dispatch_sim::sim::renewable::{Allocation, RenewableAllocator, RenewableOutput};
use dispatch_sim::sim::types::{Constraint, DispatchPlan, HOURS_PER_YEAR, TechnologyUnit, UnitKind};

/// A constant series covering the whole year.
pub fn flat_year(value: f64) -> Vec<f64> {
    vec![value; HOURS_PER_YEAR]
}

/// Renewable output with the given hourly values.
pub fn renewable(name: &str, capacity: f64, output: Vec<f64>) -> RenewableOutput {
    RenewableOutput {
        name: name.to_string(),
        kind: UnitKind::Renewable,
        capacity,
        output,
    }
}

/// Dispatchable generator with an always-on floor fraction.
pub fn generator(name: &str, capacity: f64, floor: f64) -> TechnologyUnit {
    TechnologyUnit::new(name, UnitKind::Generator, capacity)
        .with_constraint(Constraint {
            capacity_min: floor,
            ..Constraint::default()
        })
        .expect("generator constraint should be valid")
}

/// Storage unit with the given limits.
pub fn storage(name: &str, capacity: f64, constraint: Constraint) -> TechnologyUnit {
    TechnologyUnit::new(name, UnitKind::Storage, capacity)
        .with_constraint(constraint)
        .expect("storage constraint should be valid")
}

/// Allocates renewables against `load`, then runs `plan` over `units`.
pub fn dispatch(
    load: &[f64],
    renewables: &[RenewableOutput],
    units: &[TechnologyUnit],
    plan: &[&str],
) -> (Allocation, DispatchOutcome) {
    let allocation = RenewableAllocator::allocate(load, renewables);
    let outcome = DispatchEngine::new(units)
        .run(allocation.shortfall.clone(), &DispatchPlan::new(plan.iter().copied()))
        .expect("dispatch should not violate storage bounds");
    (allocation, outcome)
}

/// Per-hour `load − renewables − delivered + absorbed`, which must equal the final shortfall.
pub fn balance(load: &[f64], renewables: &[RenewableOutput], outcome: &DispatchOutcome) -> Vec<f64> {
    let mut balance = load.to_vec();
    for source in renewables {
        for (b, o) in balance.iter_mut().zip(&source.output) {
            *b -= o;
        }
    }
    for record in &outcome.records {
        for (b, o) in balance.iter_mut().zip(record.output()) {
            *b -= o;
        }
    }
    for store in outcome.storage_records() {
        for (b, c) in balance.iter_mut().zip(&store.charge) {
            *b += c;
        }
    }
    balance
}
