//! Storage dispatch: state of charge, losses, minimum runtime, and warm-up.

use serde::Serialize;
use tracing::debug;

use crate::error::{DispatchError, UnitError};

use super::shortfall::ShortfallSeries;
use super::types::{TechnologyUnit, UnitKind};

/// Run state of a storage unit between hours.
///
/// `Committed` and `Discharging` both allow discharge. `Committed` additionally
/// means the warm-up derate has not been paid yet for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageState {
    /// Waiting for a deficit long enough to commit.
    Idle,
    /// Committed to a run, not discharged yet.
    Committed,
    /// Mid-run, warm-up already applied.
    Discharging,
    /// Absorbing (or offered) surplus; the next run starts cold.
    Charging,
}

impl StorageState {
    /// State at hour 0.
    pub fn initial(min_runtime: usize, initial_level: f64) -> Self {
        if min_runtime > 0 && initial_level == 0.0 {
            Self::Idle
        } else {
            Self::Committed
        }
    }

    /// Whether the unit may discharge this hour.
    pub fn is_committed(self) -> bool {
        matches!(self, Self::Committed | Self::Discharging)
    }

    /// Whether the next discharge is the first of its run.
    pub fn warm_up_pending(self) -> bool {
        self == Self::Committed
    }

    /// Transition on a surplus hour.
    pub fn on_surplus(self) -> Self {
        Self::Charging
    }

    /// Transition at the start of a deficit hour.
    ///
    /// `window_in_deficit` is the look-ahead verdict: the current hour and the
    /// next `min_runtime` hours are all deficits.
    pub fn on_deficit(self, min_runtime: usize, window_in_deficit: bool) -> Self {
        if self.is_committed() {
            self
        } else if min_runtime == 0 || window_in_deficit {
            Self::Committed
        } else {
            Self::Idle
        }
    }

    /// Transition after energy was drawn from the store.
    pub fn on_discharge(self) -> Self {
        match self {
            Self::Committed => Self::Discharging,
            other => other,
        }
    }
}

/// Storage limits in absolute units (MWh, MWh/h).
#[derive(Debug, Clone, PartialEq)]
pub struct StorageParams {
    pub capacity: f64,
    pub initial_level: f64,
    pub min_level: f64,
    pub max_level: f64,
    pub recharge_rate: f64,
    pub recharge_loss: f64,
    pub discharge_rate: f64,
    pub discharge_loss: f64,
    /// Share of the stored energy lost per hour.
    pub parasitic_hourly: f64,
    pub min_runtime: usize,
    pub warm_time: f64,
}

fn fraction_or_full(fraction: f64) -> f64 {
    if fraction > 0.0 { fraction } else { 1.0 }
}

impl StorageParams {
    /// Scales a storage unit's constraint fractions by its rated capacity.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstraint`] when the initial charge does
    /// not fit between the minimum and maximum levels.
    pub fn from_unit(unit: &TechnologyUnit) -> Result<Self, UnitError> {
        debug_assert_eq!(unit.kind, UnitKind::Storage);
        let c = &unit.constraint;
        let capacity = unit.rated_capacity();
        let max_level = capacity * fraction_or_full(c.capacity_max);
        let min_level = capacity * c.capacity_min;
        let initial_level = c.initial * unit.multiplier;
        if initial_level > max_level + level_tolerance(capacity) {
            return Err(UnitError::InvalidConstraint {
                name: unit.name.clone(),
                reason: format!(
                    "initial charge {initial_level} exceeds the maximum level {max_level}"
                ),
            });
        }
        Ok(Self {
            capacity,
            initial_level,
            min_level,
            max_level,
            recharge_rate: capacity * fraction_or_full(c.recharge_max),
            recharge_loss: c.recharge_loss,
            discharge_rate: capacity * fraction_or_full(c.discharge_max),
            discharge_loss: c.discharge_loss,
            parasitic_hourly: c.parasitic_loss / 24.0,
            min_runtime: c.min_runtime,
            warm_time: c.warm_time,
        })
    }
}

fn level_tolerance(capacity: f64) -> f64 {
    1e-9 * capacity.max(1.0)
}

/// Hourly trace of one storage unit.
#[derive(Debug, Clone, Default)]
pub struct StorageRecord {
    pub name: String,
    pub capacity: f64,
    pub initial_level: f64,
    /// Surplus absorbed from the grid, before charge losses.
    pub charge: Vec<f64>,
    /// Energy delivered to the load, after discharge losses.
    pub discharge: Vec<f64>,
    /// Parasitic, charge, and discharge losses.
    pub losses: Vec<f64>,
    /// State of charge at the end of each hour.
    pub level: Vec<f64>,
    pub states: Vec<StorageState>,
    /// Shortfall after this unit, withheld floors added back.
    pub residual: Vec<f64>,
}

impl StorageRecord {
    fn with_capacity(name: &str, params: &StorageParams, hours: usize) -> Self {
        Self {
            name: name.to_string(),
            capacity: params.capacity,
            initial_level: params.initial_level,
            charge: Vec::with_capacity(hours),
            discharge: Vec::with_capacity(hours),
            losses: Vec::with_capacity(hours),
            level: Vec::with_capacity(hours),
            states: Vec::with_capacity(hours),
            residual: Vec::with_capacity(hours),
        }
    }

    pub fn total_discharge(&self) -> f64 {
        self.discharge.iter().sum()
    }

    pub fn total_charge(&self) -> f64 {
        self.charge.iter().sum()
    }

    pub fn total_losses(&self) -> f64 {
        self.losses.iter().sum()
    }

    pub fn peak_discharge(&self) -> f64 {
        self.discharge.iter().copied().fold(0.0, f64::max)
    }

    pub fn peak_charge(&self) -> f64 {
        self.charge.iter().copied().fold(0.0, f64::max)
    }

    pub fn peak_level(&self) -> f64 {
        self.level
            .iter()
            .copied()
            .fold(self.initial_level, f64::max)
    }

    pub fn hours_discharging(&self) -> usize {
        self.discharge.iter().filter(|&&d| d > 0.0).count()
    }
}

/// Runs one storage unit over the whole shortfall series, in place.
///
/// `withheld` is the sum of generator floors still subtracted from the series;
/// it is only added back for the residual record.
///
/// # Errors
///
/// Returns [`DispatchError::InvariantViolation`] if a charge leaves the level
/// above `max_level` or a discharge leaves it below `min_level`.
pub fn simulate(
    name: &str,
    params: &StorageParams,
    shortfall: &mut ShortfallSeries,
    withheld: f64,
) -> Result<StorageRecord, DispatchError> {
    let hours = shortfall.len();
    let mut record = StorageRecord::with_capacity(name, params, hours);
    let tolerance = level_tolerance(params.capacity);
    let mut level = params.initial_level;
    let mut state = StorageState::initial(params.min_runtime, level);

    let violation = |hour: usize, level: f64| DispatchError::InvariantViolation {
        unit: name.to_string(),
        hour,
        level,
        min_level: params.min_level,
        max_level: params.max_level,
    };

    for h in 0..hours {
        let mut losses = 0.0;
        let mut charged = 0.0;
        let mut delivered = 0.0;

        if level > 0.0 && params.parasitic_hourly > 0.0 {
            let leak = level * params.parasitic_hourly;
            level -= leak;
            losses += leak;
        }

        let s = shortfall[h];
        if s < 0.0 {
            state = state.on_surplus();
            let keep = 1.0 - params.recharge_loss;
            let headroom = (params.max_level - level) / keep;
            if headroom > 0.0 {
                let absorbed = s.max(-headroom.min(params.recharge_rate / keep));
                let stored = -absorbed * keep;
                level += stored;
                losses += -absorbed - stored;
                shortfall[h] -= absorbed;
                charged = -absorbed;
                if level > params.max_level + tolerance {
                    return Err(violation(h, level));
                }
            }
        } else {
            let window_in_deficit = !state.is_committed()
                && params.min_runtime > 0
                && s > 0.0
                && shortfall.deficit_persists(h, params.min_runtime);
            state = state.on_deficit(params.min_runtime, window_in_deficit);
            if state.is_committed() {
                let keep = 1.0 - params.discharge_loss;
                let mut can_use = (s / keep)
                    .min(params.discharge_rate)
                    .min(level - params.min_level)
                    .max(0.0);
                if can_use > 0.0 {
                    if state.warm_up_pending() && params.warm_time > 0.0 {
                        can_use *= 1.0 - params.warm_time;
                    }
                    state = state.on_discharge();
                    level -= can_use;
                    delivered = can_use * keep;
                    losses += can_use - delivered;
                    shortfall[h] -= delivered;
                    if level < params.min_level - tolerance {
                        return Err(violation(h, level));
                    }
                }
            }
        }

        if level < 0.0 {
            level = 0.0;
        }
        record.charge.push(charged);
        record.discharge.push(delivered);
        record.losses.push(losses);
        record.level.push(level);
        record.states.push(state);
        record.residual.push(shortfall[h] + withheld);
    }

    debug!(
        unit = name,
        delivered = record.total_discharge(),
        absorbed = record.total_charge(),
        final_level = level,
        "storage dispatched"
    );
    Ok(record)
}
