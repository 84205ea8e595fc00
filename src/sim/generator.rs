//! Dispatchable generator turns.

use tracing::debug;

use crate::error::UnitError;

use super::shortfall::ShortfallSeries;
use super::types::{TechnologyUnit, UnitKind};

/// Output limits of a generator in MW.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorParams {
    pub capacity: f64,
    /// Output ceiling (capacity × max fraction, full when the fraction is 0).
    pub max_output: f64,
    /// Always-on minimum output.
    pub floor: f64,
}

impl GeneratorParams {
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstraint`] if the floor exceeds the ceiling.
    pub fn from_unit(unit: &TechnologyUnit) -> Result<Self, UnitError> {
        debug_assert_eq!(unit.kind, UnitKind::Generator);
        let capacity = unit.rated_capacity();
        let max_fraction = if unit.constraint.capacity_max > 0.0 {
            unit.constraint.capacity_max
        } else {
            1.0
        };
        let params = Self {
            capacity,
            max_output: capacity * max_fraction,
            floor: capacity * unit.constraint.capacity_min,
        };
        if params.floor > params.max_output {
            return Err(UnitError::InvalidConstraint {
                name: unit.name.clone(),
                reason: format!(
                    "minimum output {} exceeds maximum output {}",
                    params.floor, params.max_output
                ),
            });
        }
        Ok(params)
    }

    /// Output for one hour given the shortfall the unit sees.
    pub fn supply(&self, shortfall: f64) -> f64 {
        if shortfall < 0.0 {
            self.floor
        } else if shortfall >= self.max_output {
            self.max_output
        } else if shortfall < self.floor {
            self.floor
        } else {
            shortfall
        }
    }

    /// Runs the generator over the whole series, in place.
    ///
    /// The caller restores the unit's own floor before this turn; `withheld`
    /// is the sum of floors still subtracted for later units.
    pub fn dispatch(
        &self,
        name: &str,
        shortfall: &mut ShortfallSeries,
        withheld: f64,
    ) -> GeneratorRecord {
        let hours = shortfall.len();
        let mut output = Vec::with_capacity(hours);
        let mut residual = Vec::with_capacity(hours);
        for h in 0..hours {
            let supplied = self.supply(shortfall[h]);
            shortfall[h] -= supplied;
            output.push(supplied);
            residual.push(shortfall[h] + withheld);
        }
        let record = GeneratorRecord {
            name: name.to_string(),
            capacity: self.capacity,
            floor: self.floor,
            output,
            residual,
        };
        debug!(
            unit = name,
            total = record.total(),
            hours_running = record.hours_running(),
            "generator dispatched"
        );
        record
    }
}

/// Hourly trace of one generator.
#[derive(Debug, Clone, Default)]
pub struct GeneratorRecord {
    pub name: String,
    pub capacity: f64,
    pub floor: f64,
    pub output: Vec<f64>,
    /// Shortfall after this unit, withheld floors added back.
    pub residual: Vec<f64>,
}

impl GeneratorRecord {
    pub fn total(&self) -> f64 {
        self.output.iter().sum()
    }

    pub fn hours_running(&self) -> usize {
        self.output.iter().filter(|&&o| o > 0.0).count()
    }

    pub fn max_output(&self) -> f64 {
        self.output.iter().copied().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::Constraint;

    fn make_params(capacity: f64, floor: f64, max_output: f64) -> GeneratorParams {
        GeneratorParams {
            capacity,
            max_output,
            floor,
        }
    }

    #[test]
    fn supply_follows_shortfall_between_limits() {
        let p = make_params(100.0, 20.0, 100.0);
        assert_eq!(p.supply(150.0), 100.0);
        assert_eq!(p.supply(100.0), 100.0);
        assert_eq!(p.supply(55.0), 55.0);
        assert_eq!(p.supply(10.0), 20.0);
        assert_eq!(p.supply(0.0), 20.0);
        assert_eq!(p.supply(-30.0), 20.0);
    }

    #[test]
    fn no_floor_means_off_in_surplus() {
        let p = make_params(100.0, 0.0, 100.0);
        assert_eq!(p.supply(-5.0), 0.0);
        assert_eq!(p.supply(0.0), 0.0);
    }

    #[test]
    fn dispatch_reduces_shortfall_and_records_output() {
        let p = make_params(50.0, 0.0, 50.0);
        let mut shortfall = ShortfallSeries::new(vec![80.0, 30.0, -10.0]);
        let rec = p.dispatch("Gas", &mut shortfall, 0.0);
        assert_eq!(rec.output, vec![50.0, 30.0, 0.0]);
        assert_eq!(shortfall.as_slice(), &[30.0, 0.0, -10.0]);
        assert_eq!(rec.total(), 80.0);
        assert_eq!(rec.hours_running(), 2);
        assert_eq!(rec.max_output(), 50.0);
    }

    #[test]
    fn params_from_constraint_fractions() {
        let unit = TechnologyUnit::new("Gas", UnitKind::Generator, 100.0)
            .with_constraint(Constraint {
                capacity_min: 0.2,
                capacity_max: 0.8,
                ..Constraint::default()
            })
            .unwrap();
        let p = GeneratorParams::from_unit(&unit).unwrap();
        assert!((p.floor - 20.0).abs() < 1e-9);
        assert!((p.max_output - 80.0).abs() < 1e-9);

        let unbounded = TechnologyUnit::new("Gas", UnitKind::Generator, 100.0)
            .with_constraint(Constraint {
                capacity_max: 0.0,
                ..Constraint::default()
            })
            .unwrap();
        assert_eq!(GeneratorParams::from_unit(&unbounded).unwrap().max_output, 100.0);
    }
}
