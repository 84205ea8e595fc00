//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use crate::error::ConfigError;
use crate::sim::types::{
    Constraint, DispatchPlan, GeneratorEconomics, ShortfallSign, SimConfig, UnitKind,
};

/// Top-level scenario configuration parsed from TOML.
///
/// A scenario lists its technology units as `[[unit]]` tables and the merit
/// order under `[dispatch]`. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::baseline`]
/// for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run-wide settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Technology units, in declaration order.
    #[serde(default, rename = "unit")]
    pub units: Vec<UnitConfig>,
    /// Merit order.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Run-wide settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Year label used in reports.
    pub year: i32,
    /// Discount rate for units without their own (>= 0).
    pub discount_rate: f64,
    /// Carbon price per tCO2e (>= 0).
    pub carbon_price: f64,
    /// Report zero cost for units that produced nothing.
    pub remove_cost_when_idle: bool,
    /// Export sign of the shortfall: `"deficit"` or `"surplus"` positive.
    pub shortfall_sign: String,
    /// CSV file with one column per series; synthetic profiles are used when absent.
    pub series: Option<PathBuf>,
    /// Master random seed for synthetic profiles.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            year: 2024,
            discount_rate: 0.05,
            carbon_price: 0.0,
            remove_cost_when_idle: false,
            shortfall_sign: "deficit".to_string(),
            series: None,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Parsed sign convention, `None` if the name is unknown.
    pub fn sign(&self) -> Option<ShortfallSign> {
        match self.shortfall_sign.as_str() {
            "deficit" => Some(ShortfallSign::Deficit),
            "surplus" => Some(ShortfallSign::Surplus),
            _ => None,
        }
    }

    /// Engine run settings.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unknown sign or a negative rate or price.
    pub fn to_sim_config(&self) -> Result<SimConfig, ConfigError> {
        let shortfall_sign = self.sign().ok_or_else(|| {
            ConfigError::new(
                "simulation.shortfall_sign",
                format!(
                    "must be \"deficit\" or \"surplus\", got \"{}\"",
                    self.shortfall_sign
                ),
            )
        })?;
        if self.discount_rate.is_nan() || self.discount_rate < 0.0 {
            return Err(ConfigError::new("simulation.discount_rate", "must be >= 0"));
        }
        if self.carbon_price.is_nan() || self.carbon_price < 0.0 {
            return Err(ConfigError::new("simulation.carbon_price", "must be >= 0"));
        }
        let mut cfg = SimConfig::new(self.year, self.discount_rate, self.carbon_price);
        cfg.remove_cost_when_idle = self.remove_cost_when_idle;
        cfg.shortfall_sign = shortfall_sign;
        Ok(cfg)
    }
}

/// One `[[unit]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {
    pub name: String,
    /// One of [`UnitKind::NAMES`].
    pub kind: String,
    /// Rated capacity (MW, MWh for storage).
    #[serde(default)]
    pub capacity: f64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Column name in the series CSV; defaults to the unit name.
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub economics: EconomicsConfig,
    #[serde(default)]
    pub constraint: ConstraintConfig,
    /// Synthetic profile used when the scenario has no series file.
    #[serde(default)]
    pub profile: Option<ProfileConfig>,
}

fn default_multiplier() -> f64 {
    1.0
}

impl UnitConfig {
    /// A unit of the given kind with default economics and limits.
    pub fn new(name: &str, kind: UnitKind, capacity: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            capacity,
            multiplier: 1.0,
            series: None,
            zone: None,
            economics: EconomicsConfig::default(),
            constraint: ConstraintConfig::default(),
            profile: None,
        }
    }

    fn with_profile(mut self, profile: ProfileConfig) -> Self {
        self.profile = Some(profile);
        self
    }

    fn with_economics(mut self, economics: EconomicsConfig) -> Self {
        self.economics = economics;
        self
    }

    fn with_constraint(mut self, constraint: ConstraintConfig) -> Self {
        self.constraint = constraint;
        self
    }

    /// Column this unit reads from the series CSV.
    pub fn series_name(&self) -> &str {
        self.series.as_deref().unwrap_or(&self.name)
    }
}

/// `[unit.economics]`: every field defaults to zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicsConfig {
    pub capex: f64,
    pub fixed_om: f64,
    pub variable_om: f64,
    pub fuel: f64,
    pub discount_rate: f64,
    pub lifetime: f64,
    pub emissions: f64,
    pub area: f64,
    pub reference_lcoe: f64,
    pub reference_cf: f64,
}

impl EconomicsConfig {
    pub fn to_economics(&self) -> GeneratorEconomics {
        GeneratorEconomics {
            capex: self.capex,
            fixed_om: self.fixed_om,
            variable_om: self.variable_om,
            fuel: self.fuel,
            discount_rate: self.discount_rate,
            lifetime: self.lifetime,
            emissions: self.emissions,
            area: self.area,
            reference_lcoe: self.reference_lcoe,
            reference_cf: self.reference_cf,
        }
    }
}

/// `[unit.constraint]`: fractions of capacity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstraintConfig {
    pub capacity_min: f64,
    /// 0 means full capacity.
    pub capacity_max: f64,
    pub recharge_max: f64,
    pub recharge_loss: f64,
    pub discharge_max: f64,
    pub discharge_loss: f64,
    /// Share of the stored energy lost per day.
    pub parasitic_loss: f64,
    pub min_runtime: usize,
    /// Fraction, minutes (>= 1), or fraction of a day (<= 1/24).
    pub warm_time: f64,
    /// Charge at hour 0 (MWh, before the multiplier).
    pub initial: f64,
}

impl Default for ConstraintConfig {
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

/// Normalises a warm-up time to an output derate fraction.
///
/// Values of 1 or more are minutes (capped at an hour); values of at most
/// 1/24 are fractions of a day.
pub fn warm_fraction(warm_time: f64) -> f64 {
    if warm_time >= 1.0 {
        (warm_time / 60.0).min(1.0)
    } else if warm_time > 0.0 && warm_time <= 1.0 / 24.0 {
        warm_time * 24.0
    } else {
        warm_time
    }
}

impl ConstraintConfig {
    pub fn to_constraint(&self) -> Constraint {
        Constraint {
            capacity_min: self.capacity_min,
            capacity_max: self.capacity_max,
            recharge_max: self.recharge_max,
            recharge_loss: self.recharge_loss,
            discharge_max: self.discharge_max,
            discharge_loss: self.discharge_loss,
            parasitic_loss: self.parasitic_loss,
            min_runtime: self.min_runtime,
            warm_time: warm_fraction(self.warm_time),
            initial: self.initial,
        }
    }
}

/// Shape of a synthetic hourly profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case", deny_unknown_fields)]
pub enum ProfileConfig {
    /// Constant value every hour.
    Flat { level: f64 },
    /// Daily and seasonal sinusoid with Gaussian noise (load shapes).
    Sinusoid {
        base: f64,
        daily_amp: f64,
        #[serde(default)]
        seasonal_amp: f64,
        #[serde(default)]
        phase_rad: f64,
        #[serde(default)]
        noise_std: f64,
    },
    /// Daylight half-sine between sunrise and sunset hours, scaled by capacity.
    Solar {
        sunrise: usize,
        sunset: usize,
        #[serde(default)]
        seasonal_swing: f64,
        #[serde(default)]
        noise_std: f64,
    },
    /// Mean-reverting capacity factor, scaled by capacity.
    Wind {
        mean_cf: f64,
        alpha: f64,
        #[serde(default)]
        noise_std: f64,
    },
}

/// `[dispatch]`: merit order by unit name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    pub order: Vec<String>,
}

impl DispatchConfig {
    pub fn plan(&self) -> DispatchPlan {
        DispatchPlan::new(self.order.iter().cloned())
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: wind and solar firmed by coal, gas, and a battery.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            units: vec![
                UnitConfig::new("Load", UnitKind::Load, 0.0).with_profile(
                    ProfileConfig::Sinusoid {
                        base: 1000.0,
                        daily_amp: 250.0,
                        seasonal_amp: 100.0,
                        phase_rad: 1.2,
                        noise_std: 20.0,
                    },
                ),
                UnitConfig::new("Wind", UnitKind::Renewable, 500.0)
                    .with_profile(ProfileConfig::Wind {
                        mean_cf: 0.35,
                        alpha: 0.9,
                        noise_std: 0.08,
                    })
                    .with_economics(EconomicsConfig {
                        reference_lcoe: 60.0,
                        ..EconomicsConfig::default()
                    }),
                UnitConfig::new("Solar", UnitKind::Renewable, 300.0)
                    .with_profile(ProfileConfig::Solar {
                        sunrise: 6,
                        sunset: 19,
                        seasonal_swing: 0.25,
                        noise_std: 0.05,
                    })
                    .with_economics(EconomicsConfig {
                        reference_lcoe: 50.0,
                        area: 2.0,
                        ..EconomicsConfig::default()
                    }),
                UnitConfig::new("Battery", UnitKind::Storage, 400.0)
                    .with_economics(EconomicsConfig {
                        capex: 400_000.0,
                        fixed_om: 5_000.0,
                        lifetime: 15.0,
                        ..EconomicsConfig::default()
                    })
                    .with_constraint(ConstraintConfig {
                        capacity_min: 0.1,
                        recharge_max: 0.5,
                        recharge_loss: 0.05,
                        discharge_max: 0.5,
                        discharge_loss: 0.05,
                        parasitic_loss: 0.01,
                        initial: 200.0,
                        ..ConstraintConfig::default()
                    }),
                UnitConfig::new("Coal", UnitKind::Generator, 600.0)
                    .with_economics(EconomicsConfig {
                        capex: 3_000_000.0,
                        fixed_om: 40_000.0,
                        variable_om: 5.0,
                        fuel: 25.0,
                        lifetime: 40.0,
                        emissions: 0.9,
                        ..EconomicsConfig::default()
                    })
                    .with_constraint(ConstraintConfig {
                        capacity_min: 0.3,
                        ..ConstraintConfig::default()
                    }),
                UnitConfig::new("Gas", UnitKind::Generator, 800.0).with_economics(
                    EconomicsConfig {
                        capex: 900_000.0,
                        fixed_om: 15_000.0,
                        variable_om: 4.0,
                        fuel: 70.0,
                        lifetime: 30.0,
                        emissions: 0.5,
                        ..EconomicsConfig::default()
                    },
                ),
            ],
            dispatch: DispatchConfig {
                order: vec!["Coal".into(), "Battery".into(), "Gas".into()],
            },
        }
    }

    /// Returns the high-renewables preset: triple the wind and solar, larger battery.
    pub fn high_renewables() -> Self {
        let mut cfg = Self::baseline();
        cfg.simulation.carbon_price = 30.0;
        for unit in &mut cfg.units {
            match unit.name.as_str() {
                "Wind" | "Solar" => unit.multiplier = 3.0,
                "Battery" => {
                    unit.capacity = 1500.0;
                    unit.constraint.initial = 750.0;
                }
                "Coal" => unit.constraint.capacity_min = 0.1,
                _ => {}
            }
        }
        cfg.dispatch.order = vec!["Battery".into(), "Coal".into(), "Gas".into()];
        cfg
    }

    /// Returns the firmed preset: pumped hydro with a minimum run time and
    /// warm-up, plus rooftop solar behind the meter.
    pub fn firmed() -> Self {
        let mut cfg = Self::baseline();
        cfg.simulation.carbon_price = 50.0;
        cfg.simulation.remove_cost_when_idle = true;
        cfg.units.push(
            UnitConfig::new("Pumped Hydro", UnitKind::Storage, 2000.0)
                .with_economics(EconomicsConfig {
                    capex: 250_000.0,
                    fixed_om: 8_000.0,
                    lifetime: 50.0,
                    ..EconomicsConfig::default()
                })
                .with_constraint(ConstraintConfig {
                    capacity_min: 0.05,
                    recharge_max: 0.15,
                    recharge_loss: 0.1,
                    discharge_max: 0.15,
                    discharge_loss: 0.1,
                    min_runtime: 3,
                    warm_time: 10.0,
                    initial: 1000.0,
                    ..ConstraintConfig::default()
                }),
        );
        cfg.units.push(
            UnitConfig::new("Rooftop PV", UnitKind::UnderlyingLoad, 150.0).with_profile(
                ProfileConfig::Solar {
                    sunrise: 6,
                    sunset: 19,
                    seasonal_swing: 0.25,
                    noise_std: 0.1,
                },
            ),
        );
        cfg.dispatch.order = vec![
            "Coal".into(),
            "Battery".into(),
            "Pumped Hydro".into(),
            "Gas".into(),
        ];
        cfg
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "high_renewables", "firmed"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "high_renewables" => Ok(Self::high_renewables()),
            "firmed" => Ok(Self::firmed()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// A relative `simulation.series` path is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let (Some(series), Some(dir)) = (&cfg.simulation.series, path.parent()) {
            if series.is_relative() {
                cfg.simulation.series = Some(dir.join(series));
            }
        }
        Ok(cfg)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Engine settings for this scenario.
    ///
    /// # Errors
    ///
    /// See [`SimulationConfig::to_sim_config`].
    pub fn sim_config(&self) -> Result<SimConfig, ConfigError> {
        self.simulation.to_sim_config()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Economics and
    /// operating limits are checked per unit when the scenario is built;
    /// a unit failing them is excluded from the run rather than rejected here.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.sign().is_none() {
            errors.push(ConfigError::new(
                "simulation.shortfall_sign",
                format!(
                    "must be \"deficit\" or \"surplus\", got \"{}\"",
                    s.shortfall_sign
                ),
            ));
        }
        if s.discount_rate.is_nan() || s.discount_rate < 0.0 {
            errors.push(ConfigError::new("simulation.discount_rate", "must be >= 0"));
        }
        if s.carbon_price.is_nan() || s.carbon_price < 0.0 {
            errors.push(ConfigError::new("simulation.carbon_price", "must be >= 0"));
        }

        let mut names = HashSet::new();
        let mut loads = 0;
        for (i, unit) in self.units.iter().enumerate() {
            let field = |name: &str| format!("unit[{i}].{name}");
            if unit.name.trim().is_empty() {
                errors.push(ConfigError::new(field("name"), "must not be empty"));
            } else if !names.insert(unit.name.as_str()) {
                errors.push(ConfigError::new(
                    field("name"),
                    format!("duplicate unit name \"{}\"", unit.name),
                ));
            }

            let kind = UnitKind::from_name(&unit.kind);
            match kind {
                None => errors.push(ConfigError::new(
                    field("kind"),
                    format!(
                        "must be one of {}, got \"{}\"",
                        UnitKind::NAMES.join(", "),
                        unit.kind
                    ),
                )),
                Some(UnitKind::Load) => loads += 1,
                Some(_) => {}
            }

            if !unit.capacity.is_finite() || unit.capacity < 0.0 {
                errors.push(ConfigError::new(field("capacity"), "must be a finite value >= 0"));
            }
            if !unit.multiplier.is_finite() || unit.multiplier < 0.0 {
                errors.push(ConfigError::new(
                    field("multiplier"),
                    "must be a finite value >= 0",
                ));
            }

            if kind.is_some_and(UnitKind::needs_series)
                && s.series.is_none()
                && unit.profile.is_none()
            {
                errors.push(ConfigError::new(
                    field("profile"),
                    "required when simulation.series is not set",
                ));
            }
            if let Some(ProfileConfig::Solar {
                sunrise, sunset, ..
            }) = unit.profile
            {
                if sunrise >= sunset {
                    errors.push(ConfigError::new(
                        field("profile.sunrise"),
                        "must be < profile.sunset",
                    ));
                }
                if sunset > 24 {
                    errors.push(ConfigError::new(field("profile.sunset"), "must be <= 24"));
                }
            }
            if let Some(ProfileConfig::Wind { mean_cf, alpha, .. }) = unit.profile {
                if !(0.0..=1.0).contains(&mean_cf) {
                    errors.push(ConfigError::new(
                        field("profile.mean_cf"),
                        "must be in [0.0, 1.0]",
                    ));
                }
                if !(0.0..1.0).contains(&alpha) {
                    errors.push(ConfigError::new(
                        field("profile.alpha"),
                        "must be in [0.0, 1.0)",
                    ));
                }
            }
        }

        if loads != 1 {
            errors.push(ConfigError::new(
                "unit",
                format!("exactly one unit of kind \"load\" is required, found {loads}"),
            ));
        }

        for (i, name) in self.dispatch.order.iter().enumerate() {
            if name.trim().is_empty() {
                errors.push(ConfigError::new(
                    format!("dispatch.order[{i}]"),
                    "must not be empty",
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
year = 2030
discount_rate = 0.07
carbon_price = 25.0
shortfall_sign = "surplus"
seed = 99

[[unit]]
name = "Load"
kind = "load"
profile = { shape = "flat", level = 800.0 }

[[unit]]
name = "SA.Wind"
kind = "renewable"
capacity = 300.0
multiplier = 2.0

[unit.economics]
reference_lcoe = 55.0
reference_cf = 0.38

[unit.profile]
shape = "wind"
mean_cf = 0.4
alpha = 0.85

[[unit]]
name = "Hydro"
kind = "storage"
capacity = 1000.0

[unit.constraint]
discharge_loss = 0.1
min_runtime = 4
warm_time = 30.0
initial = 500.0

[dispatch]
order = ["Hydro"]
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.unwrap();
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.simulation.year, 2030);
        assert_eq!(cfg.units.len(), 3);
        assert_eq!(cfg.units[1].multiplier, 2.0);
        assert_eq!(cfg.units[0].multiplier, 1.0);
        assert_eq!(
            cfg.units[0].profile,
            Some(ProfileConfig::Flat { level: 800.0 })
        );
        assert_eq!(cfg.units[2].constraint.to_constraint().warm_time, 0.5);
        let sim = cfg.sim_config().unwrap();
        assert_eq!(sim.shortfall_sign, ShortfallSign::Surplus);
        assert_eq!(cfg.dispatch.plan().len(), 1);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
year = 2024
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_profile_shape_is_rejected() {
        let toml = r#"
[[unit]]
name = "Load"
kind = "load"
profile = { shape = "tidal", level = 1.0 }
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_bad_sign() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.shortfall_sign = "upside_down".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.shortfall_sign"));
        assert!(cfg.sim_config().is_err());
    }

    #[test]
    fn validation_catches_duplicate_and_bad_kind() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.units.push(UnitConfig::new("Gas", UnitKind::Generator, 10.0));
        cfg.units[1].kind = "nuclear_fusion".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.message.contains("duplicate unit name")));
        assert!(errors.iter().any(|e| e.field == "unit[1].kind"));
    }

    #[test]
    fn validation_requires_one_load() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.units.retain(|u| u.kind != "load");
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "unit"));
    }

    #[test]
    fn validation_requires_profile_without_series_file() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.units[1].profile = None;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "unit[1].profile"));

        cfg.simulation.series = Some(PathBuf::from("series.csv"));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_catches_negative_capacity() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.units[4].capacity = -1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "unit[4].capacity"));
    }

    #[test]
    fn validation_catches_bad_solar_hours() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.units[2].profile = Some(ProfileConfig::Solar {
            sunrise: 20,
            sunset: 26,
            seasonal_swing: 0.0,
            noise_std: 0.0,
        });
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "unit[2].profile.sunset"));

        cfg.units[2].profile = Some(ProfileConfig::Solar {
            sunrise: 12,
            sunset: 12,
            seasonal_swing: 0.0,
            noise_std: 0.0,
        });
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "unit[2].profile.sunrise"));
    }

    #[test]
    fn warm_time_units() {
        assert_eq!(warm_fraction(0.25), 0.25);
        assert_eq!(warm_fraction(30.0), 0.5);
        assert_eq!(warm_fraction(90.0), 1.0);
        assert!((warm_fraction(1.0 / 48.0) - 0.5).abs() < 1e-12);
        assert_eq!(warm_fraction(0.0), 0.0);
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn high_renewables_scales_wind_and_solar() {
        let cfg = ScenarioConfig::high_renewables();
        let wind = cfg.units.iter().find(|u| u.name == "Wind").unwrap();
        assert_eq!(wind.multiplier, 3.0);
        assert_eq!(cfg.dispatch.order[0], "Battery");
    }

    #[test]
    fn firmed_adds_underlying_load() {
        let cfg = ScenarioConfig::firmed();
        assert!(cfg.units.iter().any(|u| u.kind == "underlying_load"));
        assert_eq!(cfg.dispatch.order.len(), 4);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.simulation.seed, 99);
        assert_eq!(cfg.simulation.discount_rate, 0.05);
        assert!(cfg.units.is_empty());
        assert!(cfg.dispatch.order.is_empty());
    }

    #[test]
    fn series_column_defaults_to_unit_name() {
        let mut unit = UnitConfig::new("Wind", UnitKind::Renewable, 1.0);
        assert_eq!(unit.series_name(), "Wind");
        unit.series = Some("wind_cf".to_string());
        assert_eq!(unit.series_name(), "wind_cf");
    }
}
