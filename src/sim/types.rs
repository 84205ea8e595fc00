//! Core simulation types: run settings, technology units, economics, and the merit order.

use std::fmt;

use serde::Serialize;

use crate::error::UnitError;

/// Number of hourly values in every series the engine consumes.
pub const HOURS_PER_YEAR: usize = 8760;

/// Lifetime assumed when a unit's economics leave it at zero.
pub const DEFAULT_LIFETIME_YEARS: f64 = 20.0;

/// How the shortfall series is signed when it leaves the engine.
///
/// Internally a positive value is always unmet load and a negative value is
/// surplus generation. The sign only changes on export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ShortfallSign {
    /// Positive = deficit, negative = surplus.
    #[default]
    Deficit,
    /// Positive = surplus, negative = deficit.
    Surplus,
}

impl ShortfallSign {
    /// Multiplier that converts an internal shortfall value to the external convention.
    pub fn factor(self) -> f64 {
        match self {
            Self::Deficit => 1.0,
            Self::Surplus => -1.0,
        }
    }
}

/// Run-wide economic settings.
///
/// # Examples
///
/// ```
/// use dispatch_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(2024, 0.05, 30.0);
/// assert_eq!(cfg.discount_rate, 0.05);
/// assert!(!cfg.remove_cost_when_idle);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SimConfig {
    /// Calendar year the series describe (reporting only).
    pub year: i32,
    /// Discount rate used by units that do not set their own.
    pub discount_rate: f64,
    /// Carbon price ($/tCO2e).
    pub carbon_price: f64,
    /// Report zero cost for units that produced nothing.
    pub remove_cost_when_idle: bool,
    /// Sign convention of exported shortfall columns.
    pub shortfall_sign: ShortfallSign,
}

impl SimConfig {
    /// Creates run settings with cost-when-idle kept and deficit-positive export.
    ///
    /// # Panics
    ///
    /// Panics if `discount_rate` or `carbon_price` is negative.
    pub fn new(year: i32, discount_rate: f64, carbon_price: f64) -> Self {
        assert!(discount_rate >= 0.0, "discount_rate must be >= 0");
        assert!(carbon_price >= 0.0, "carbon_price must be >= 0");
        Self {
            year,
            discount_rate,
            carbon_price,
            remove_cost_when_idle: false,
            shortfall_sign: ShortfallSign::Deficit,
        }
    }
}

/// Role a technology unit plays in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnitKind {
    /// Non-dispatched generation, allocated before the merit order.
    Renewable,
    /// Dispatchable generator called upon in merit order.
    Generator,
    /// Energy storage called upon in merit order.
    Storage,
    /// The target load.
    Load,
    /// Behind-the-meter generation reported as additional load.
    UnderlyingLoad,
}

impl UnitKind {
    /// Configuration names, in declaration order.
    pub const NAMES: &[&str] = &[
        "renewable",
        "generator",
        "storage",
        "load",
        "underlying_load",
    ];

    /// Parses a configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "renewable" => Some(Self::Renewable),
            "generator" => Some(Self::Generator),
            "storage" => Some(Self::Storage),
            "load" => Some(Self::Load),
            "underlying_load" => Some(Self::UnderlyingLoad),
            _ => None,
        }
    }

    /// Whether the kind may appear in a [`DispatchPlan`].
    pub fn is_dispatchable(self) -> bool {
        matches!(self, Self::Generator | Self::Storage)
    }

    /// Whether units of this kind need an hourly series.
    pub fn needs_series(self) -> bool {
        matches!(self, Self::Renewable | Self::Load | Self::UnderlyingLoad)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Renewable => "renewable",
            Self::Generator => "generator",
            Self::Storage => "storage",
            Self::Load => "load",
            Self::UnderlyingLoad => "underlying_load",
        };
        f.write_str(name)
    }
}

/// Cost and emissions parameters of a unit.
///
/// The default value is a zero-cost facility.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratorEconomics {
    /// Capital cost ($/MW).
    pub capex: f64,
    /// Fixed operations and maintenance ($/MW/yr).
    pub fixed_om: f64,
    /// Variable operations and maintenance ($/MWh).
    pub variable_om: f64,
    /// Fuel cost ($/MWh).
    pub fuel: f64,
    /// Unit discount rate; zero falls back to the run discount rate.
    pub discount_rate: f64,
    /// Economic lifetime in years; zero means [`DEFAULT_LIFETIME_YEARS`].
    pub lifetime: f64,
    /// Emissions factor (tCO2e/MWh).
    pub emissions: f64,
    /// Land area per MW of capacity.
    pub area: f64,
    /// Reference levelised cost ($/MWh).
    pub reference_lcoe: f64,
    /// Capacity factor the reference cost was quoted at.
    pub reference_cf: f64,
}

impl GeneratorEconomics {
    /// Lifetime in years with the zero default applied.
    pub fn lifetime_years(&self) -> f64 {
        if self.lifetime > 0.0 {
            self.lifetime
        } else {
            DEFAULT_LIFETIME_YEARS
        }
    }

    /// Discount rate with the run-wide fallback applied.
    pub fn effective_discount_rate(&self, run_rate: f64) -> f64 {
        if self.discount_rate > 0.0 {
            self.discount_rate
        } else {
            run_rate
        }
    }

    /// Resolves which pricing model applies to the unit.
    ///
    /// Capex/opex fields take precedence, then the reference cost. A unit
    /// with neither a reference cost nor a reference capacity factor is a
    /// zero-cost facility.
    ///
    /// # Errors
    ///
    /// Returns a [`UnitError`] for negative or non-finite fields, and for a
    /// reference capacity factor given without a reference cost.
    pub fn pricing_mode(&self, unit: &str) -> Result<PricingMode, UnitError> {
        let fields = [
            ("capex", self.capex),
            ("fixed_om", self.fixed_om),
            ("variable_om", self.variable_om),
            ("fuel", self.fuel),
            ("discount_rate", self.discount_rate),
            ("lifetime", self.lifetime),
            ("emissions", self.emissions),
            ("area", self.area),
            ("reference_lcoe", self.reference_lcoe),
            ("reference_cf", self.reference_cf),
        ];
        if let Some((field, value)) = fields.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(UnitError::InvalidEconomics {
                name: unit.to_string(),
                reason: format!("{field} must be a finite value >= 0, got {value}"),
            });
        }
        if self.reference_cf > 1.0 {
            return Err(UnitError::InvalidEconomics {
                name: unit.to_string(),
                reason: format!("reference_cf must be <= 1, got {}", self.reference_cf),
            });
        }

        if self.capex > 0.0 || self.fixed_om > 0.0 || self.variable_om > 0.0 || self.fuel > 0.0 {
            Ok(PricingMode::CapexOpex {
                capex: self.capex,
                fixed_om: self.fixed_om,
                variable_om: self.variable_om,
                fuel: self.fuel,
            })
        } else if self.reference_lcoe > 0.0 {
            Ok(PricingMode::ReferenceLcoe {
                lcoe: self.reference_lcoe,
                capacity_factor: (self.reference_cf > 0.0).then_some(self.reference_cf),
            })
        } else if self.reference_cf == 0.0 {
            Ok(PricingMode::ZeroCost)
        } else {
            Err(UnitError::AmbiguousPricing {
                name: unit.to_string(),
                reason: format!(
                    "reference_cf {} given without a reference_lcoe or capex/opex figures",
                    self.reference_cf
                ),
            })
        }
    }
}

/// Pricing model of a unit, resolved once when the unit is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PricingMode {
    /// Annualised capital plus operating costs.
    CapexOpex {
        capex: f64,
        fixed_om: f64,
        variable_om: f64,
        fuel: f64,
    },
    /// Reference levelised cost at a reference (or the achieved) capacity factor.
    ReferenceLcoe {
        lcoe: f64,
        capacity_factor: Option<f64>,
    },
    /// No cost at all.
    ZeroCost,
}

/// Operating limits of a generator or storage unit, as fractions of capacity.
///
/// Fractions of 0 for the `*_max` fields mean "unconstrained".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    /// Generator: always-on floor. Storage: lowest usable charge level.
    pub capacity_min: f64,
    /// Generator: output ceiling. Storage: highest usable charge level.
    pub capacity_max: f64,
    /// Storage: charge rate ceiling per hour.
    pub recharge_max: f64,
    /// Storage: share of absorbed energy lost while charging.
    pub recharge_loss: f64,
    /// Storage: discharge rate ceiling per hour.
    pub discharge_max: f64,
    /// Storage: share of drawn energy lost while discharging.
    pub discharge_loss: f64,
    /// Storage: share of the stored energy lost per day.
    pub parasitic_loss: f64,
    /// Storage: hours a deficit must persist before a run is committed.
    pub min_runtime: usize,
    /// Storage: output derate for the first hour of a discharge run.
    pub warm_time: f64,
    /// Storage: charge at hour 0 (MWh, before the multiplier).
    pub initial: f64,
}

impl Default for Constraint {
    fn default() -> Self {
        Self {
            capacity_min: 0.0,
            capacity_max: 1.0,
            recharge_max: 1.0,
            recharge_loss: 0.0,
            discharge_max: 1.0,
            discharge_loss: 0.0,
            parasitic_loss: 0.0,
            min_runtime: 0,
            warm_time: 0.0,
            initial: 0.0,
        }
    }
}

impl Constraint {
    /// Checks fraction ranges.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstraint`] naming the first offending field.
    pub fn check(&self, unit: &str) -> Result<(), UnitError> {
        let invalid = |reason: String| UnitError::InvalidConstraint {
            name: unit.to_string(),
            reason,
        };
        let unit_range = [
            ("capacity_min", self.capacity_min),
            ("capacity_max", self.capacity_max),
            ("recharge_max", self.recharge_max),
            ("discharge_max", self.discharge_max),
            ("parasitic_loss", self.parasitic_loss),
            ("warm_time", self.warm_time),
        ];
        for (field, value) in unit_range {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{field} must be in [0, 1], got {value}")));
            }
        }
        for (field, value) in [
            ("recharge_loss", self.recharge_loss),
            ("discharge_loss", self.discharge_loss),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(invalid(format!("{field} must be in [0, 1), got {value}")));
            }
        }
        if self.capacity_max > 0.0 && self.capacity_min > self.capacity_max {
            return Err(invalid(format!(
                "capacity_min {} exceeds capacity_max {}",
                self.capacity_min, self.capacity_max
            )));
        }
        if !self.initial.is_finite() || self.initial < 0.0 {
            return Err(invalid(format!("initial must be >= 0, got {}", self.initial)));
        }
        Ok(())
    }
}

/// One generation, storage, or load asset of a scenario.
///
/// Immutable for a run; only the records the engine produces change.
#[derive(Debug, Clone, Serialize)]
pub struct TechnologyUnit {
    pub name: String,
    pub kind: UnitKind,
    /// Rated capacity (MW, or MWh for storage) before the multiplier.
    pub capacity: f64,
    /// Scales capacity and every hourly value.
    pub multiplier: f64,
    /// Column of the unit's hourly series in the store.
    pub series: Option<usize>,
    zone: Option<String>,
    pub economics: GeneratorEconomics,
    pub pricing: PricingMode,
    pub constraint: Constraint,
}

impl TechnologyUnit {
    /// Creates a zero-cost, unconstrained unit.
    pub fn new(name: impl Into<String>, kind: UnitKind, capacity: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            capacity,
            multiplier: 1.0,
            series: None,
            zone: None,
            economics: GeneratorEconomics::default(),
            pricing: PricingMode::ZeroCost,
            constraint: Constraint::default(),
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_series(mut self, series: usize) -> Self {
        self.series = Some(series);
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Attaches economics and resolves the pricing mode.
    ///
    /// # Errors
    ///
    /// See [`GeneratorEconomics::pricing_mode`].
    pub fn with_economics(mut self, economics: GeneratorEconomics) -> Result<Self, UnitError> {
        self.pricing = economics.pricing_mode(&self.name)?;
        self.economics = economics;
        Ok(self)
    }

    /// Attaches operating limits.
    ///
    /// # Errors
    ///
    /// See [`Constraint::check`].
    pub fn with_constraint(mut self, constraint: Constraint) -> Result<Self, UnitError> {
        constraint.check(&self.name)?;
        self.constraint = constraint;
        Ok(self)
    }

    /// Capacity after the multiplier.
    pub fn rated_capacity(&self) -> f64 {
        self.capacity * self.multiplier
    }

    /// Whether the unit takes part in the run at all.
    pub fn is_active(&self) -> bool {
        self.rated_capacity() > 0.0
    }

    /// Explicit zone, or the part of the name before the first `.`.
    pub fn zone(&self) -> Option<&str> {
        self.zone
            .as_deref()
            .or_else(|| self.name.split_once('.').map(|(zone, _)| zone))
            .filter(|zone| !zone.is_empty())
    }
}

/// Merit order: dispatchable unit names, earliest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchPlan(Vec<String>);

impl DispatchPlan {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plan with the given names removed, order otherwise kept.
    pub fn without(&self, excluded: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|name| !excluded.contains(&name.as_str()))
                .cloned()
                .collect(),
        )
    }
}
