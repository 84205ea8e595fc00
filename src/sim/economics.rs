//! Annual cost and emissions of one unit given its yearly output.

use serde::Serialize;

use super::types::{GeneratorEconomics, HOURS_PER_YEAR, PricingMode};

/// Capital cost spread evenly (in present-value terms) over the lifetime.
///
/// Uses the capital recovery factor `r(1+r)^n / ((1+r)^n − 1)`, or a plain
/// `capital / n` when the rate is zero.
///
/// # Examples
///
/// ```
/// use dispatch_sim::sim::economics::annualised_capital;
///
/// assert_eq!(annualised_capital(1000.0, 0.0, 20.0), 50.0);
/// ```
pub fn annualised_capital(capital: f64, rate: f64, lifetime: f64) -> f64 {
    if rate > 0.0 {
        let growth = (1.0 + rate).powf(lifetime);
        capital * rate * growth / (growth - 1.0)
    } else {
        capital / lifetime
    }
}

/// Output figures a unit is costed against.
#[derive(Debug, Clone, Copy)]
pub struct CostBasis {
    /// Rated capacity after the multiplier.
    pub capacity: f64,
    /// Energy the variable costs, LCOG, and emissions are charged on.
    pub basis: f64,
    /// Energy the LCOE is spread over.
    pub lcoe_energy: f64,
}

impl CostBasis {
    /// Achieved capacity factor, `None` for zero capacity.
    pub fn capacity_factor(&self) -> Option<f64> {
        (self.capacity > 0.0).then(|| self.basis / (self.capacity * HOURS_PER_YEAR as f64))
    }
}

/// Cost figures of one unit; `None` where the figure does not apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitCosts {
    pub annual_cost: Option<f64>,
    pub capital_cost: Option<f64>,
    pub lcog: Option<f64>,
    pub lcoe: Option<f64>,
    pub reference_lcoe: Option<f64>,
    pub reference_cf: Option<f64>,
}

impl UnitCosts {
    /// Figures of a unit that is free to run.
    pub fn zero() -> Self {
        Self {
            annual_cost: Some(0.0),
            lcog: Some(0.0),
            lcoe: Some(0.0),
            ..Self::default()
        }
    }

    /// Figures of an idle unit under remove-cost-when-idle.
    pub fn idle() -> Self {
        Self {
            annual_cost: Some(0.0),
            ..Self::default()
        }
    }
}

fn per_energy(cost: f64, energy: f64) -> Option<f64> {
    (energy > 0.0).then(|| cost / energy)
}

/// Prices a unit under its resolved pricing mode.
///
/// `run_rate` is the scenario discount rate, used when the unit has none.
pub fn unit_costs(
    pricing: &PricingMode,
    economics: &GeneratorEconomics,
    run_rate: f64,
    basis: CostBasis,
) -> UnitCosts {
    match *pricing {
        PricingMode::CapexOpex {
            capex,
            fixed_om,
            variable_om,
            fuel,
        } => {
            let capital = basis.capacity * capex;
            let opex = basis.capacity * fixed_om + basis.basis * (variable_om + fuel);
            let annual = annualised_capital(
                capital,
                economics.effective_discount_rate(run_rate),
                economics.lifetime_years(),
            ) + opex;
            UnitCosts {
                annual_cost: Some(annual),
                capital_cost: Some(capital),
                lcog: per_energy(annual, basis.basis),
                lcoe: per_energy(annual, basis.lcoe_energy),
                reference_lcoe: None,
                reference_cf: None,
            }
        }
        PricingMode::ReferenceLcoe {
            lcoe,
            capacity_factor,
        } => {
            let cf = capacity_factor
                .or_else(|| basis.capacity_factor())
                .unwrap_or(0.0);
            let annual = lcoe * cf * HOURS_PER_YEAR as f64 * basis.capacity;
            UnitCosts {
                annual_cost: Some(annual),
                capital_cost: None,
                lcog: per_energy(annual, basis.basis),
                lcoe: per_energy(annual, basis.lcoe_energy),
                reference_lcoe: Some(lcoe),
                reference_cf: Some(cf),
            }
        }
        PricingMode::ZeroCost => UnitCosts::zero(),
    }
}

/// Emissions of one unit and their cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Emissions {
    /// tCO2e per year.
    pub tonnes: f64,
    /// Carbon cost per year.
    pub cost: f64,
    /// LCOE including the carbon cost.
    pub lcoe_with_carbon: Option<f64>,
}

/// Emissions of `basis` MWh at `factor` t/MWh.
///
/// `annual_cost` and `lcoe` come from [`unit_costs`]; `to_meet_load` is the
/// unit's load-credited energy.
pub fn emissions(
    factor: f64,
    carbon_price: f64,
    basis: f64,
    to_meet_load: f64,
    annual_cost: Option<f64>,
    lcoe: Option<f64>,
) -> Emissions {
    if factor <= 0.0 {
        return Emissions {
            lcoe_with_carbon: lcoe,
            ..Emissions::default()
        };
    }
    let tonnes = basis * factor;
    let cost = tonnes * carbon_price;
    let lcoe_with_carbon = match (annual_cost, lcoe) {
        (Some(c), Some(l)) if c > 0.0 => Some(l * (c + cost) / c),
        (Some(c), _) if c == 0.0 => per_energy(cost, to_meet_load),
        _ => None,
    };
    Emissions {
        tonnes,
        cost,
        lcoe_with_carbon,
    }
}
