//! Properties that must hold for any load, supply, and plan.

mod common;

use proptest::prelude::*;

use dispatch_sim::sim::renewable::RenewableAllocator;
use dispatch_sim::sim::storage::StorageParams;
use dispatch_sim::sim::types::{Constraint, TechnologyUnit};

const TOLERANCE: f64 = 1e-6;

fn hours() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0f64..200.0, 0.0f64..200.0), 1..72)
}

fn storage_constraint() -> impl Strategy<Value = Constraint> {
    (
        0.0f64..0.3,
        0.5f64..=1.0,
        0.0f64..0.4,
        0.0f64..0.4,
        0usize..4,
        0.0f64..0.5,
        0.0f64..=1.0,
    )
        .prop_map(
            |(min, max, recharge_loss, discharge_loss, min_runtime, warm_time, fill)| Constraint {
                capacity_min: min,
                capacity_max: max,
                recharge_loss,
                discharge_loss,
                min_runtime,
                warm_time,
                // Somewhere between the minimum and maximum level of a 100 MWh store.
                initial: 100.0 * (min + (max - min) * fill),
                ..Constraint::default()
            },
        )
}

fn split(hours: &[(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    hours.iter().copied().unzip()
}

proptest! {
    #[test]
    fn energy_is_conserved(
        hours in hours(),
        constraint in storage_constraint(),
        parasitic in 0.0f64..0.2,
        floor in 0.0f64..0.5,
        storage_first in any::<bool>(),
    ) {
        let (load, wind) = split(&hours);
        let renewables = [common::renewable("Wind", 200.0, wind)];
        let units = [
            common::storage("Battery", 100.0, Constraint { parasitic_loss: parasitic, ..constraint }),
            common::generator("Coal", 60.0, floor),
            common::generator("Gas", 40.0, 0.0),
        ];
        let plan: &[&str] = if storage_first {
            &["Battery", "Coal", "Gas"]
        } else {
            &["Coal", "Battery", "Gas"]
        };
        let (_, outcome) = common::dispatch(&load, &renewables, &units, plan);
        let balance = common::balance(&load, &renewables, &outcome);
        for (h, (b, s)) in balance.iter().zip(outcome.shortfall.as_slice()).enumerate() {
            prop_assert!((b - s).abs() < TOLERANCE, "hour {h}: balance {b} vs shortfall {s}");
        }
    }

    #[test]
    fn storage_level_stays_in_bounds(hours in hours(), constraint in storage_constraint()) {
        let (load, wind) = split(&hours);
        let renewables = [common::renewable("Wind", 200.0, wind)];
        let units = [common::storage("Battery", 100.0, constraint)];
        let params = StorageParams::from_unit(&units[0]).unwrap();
        let (_, outcome) = common::dispatch(&load, &renewables, &units, &["Battery"]);
        let record = outcome.storage_records().next().unwrap();
        for (h, &level) in record.level.iter().enumerate() {
            prop_assert!(level >= params.min_level - TOLERANCE, "hour {h}: {level} below min");
            prop_assert!(level <= params.max_level + TOLERANCE, "hour {h}: {level} above max");
        }
    }

    #[test]
    fn delivered_never_exceeds_drawn(hours in hours(), constraint in storage_constraint()) {
        let (load, wind) = split(&hours);
        let renewables = [common::renewable("Wind", 200.0, wind)];
        let units = [common::storage("Battery", 100.0, constraint.clone())];
        let (_, outcome) = common::dispatch(&load, &renewables, &units, &["Battery"]);
        let record = outcome.storage_records().next().unwrap();
        let mut previous = constraint.initial;
        for h in 0..record.level.len() {
            let drawn = previous - record.level[h];
            if record.discharge[h] > 0.0 {
                prop_assert!(record.discharge[h] <= drawn + TOLERANCE);
                if constraint.discharge_loss > 1e-6 {
                    prop_assert!(record.discharge[h] < drawn);
                }
            }
            prop_assert!(record.losses[h] >= 0.0);
            previous = record.level[h];
        }
    }

    #[test]
    fn allocation_is_idempotent(hours in hours()) {
        let (load, wind) = split(&hours);
        let renewables = [common::renewable("Wind", 200.0, wind)];
        let first = RenewableAllocator::allocate(&load, &renewables);
        let second = RenewableAllocator::allocate(&load, &renewables);
        prop_assert_eq!(first.shortfall, second.shortfall);
        prop_assert_eq!(first.to_meet_load, second.to_meet_load);
        prop_assert_eq!(first.contribution, second.contribution);
    }

    #[test]
    fn plan_order_keeps_unmet_total(hours in hours(), coal in 0.0f64..150.0, gas in 0.0f64..150.0) {
        let (load, wind) = split(&hours);
        let renewables = [common::renewable("Wind", 200.0, wind)];
        let units = [
            common::generator("Coal", coal, 0.0),
            common::generator("Gas", gas, 0.0),
        ];
        let (_, forward) = common::dispatch(&load, &renewables, &units, &["Coal", "Gas"]);
        let (_, reverse) = common::dispatch(&load, &renewables, &units, &["Gas", "Coal"]);
        let unmet = forward.shortfall.deficit_total();
        prop_assert!((unmet - reverse.shortfall.deficit_total()).abs() < TOLERANCE);
        prop_assert!((forward.shortfall.surplus_total() - reverse.shortfall.surplus_total()).abs() < TOLERANCE);
    }
}

#[test]
fn zero_capacity_units_change_nothing() {
    let load = vec![100.0, 50.0, 0.0];
    let units = [
        common::generator("Gas", 0.0, 0.5),
        TechnologyUnit::new("Battery", dispatch_sim::sim::types::UnitKind::Storage, 0.0),
    ];
    let (allocation, outcome) = common::dispatch(&load, &[], &units, &["Gas", "Battery"]);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.shortfall, allocation.shortfall);
}
