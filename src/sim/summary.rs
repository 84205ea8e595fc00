//! Post-hoc summary of a dispatch run: per-unit rows, system totals, and correlation.

use std::fmt;

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;

use super::correlation::{CorrelationEntry, correlation_report};
use super::economics::{self, CostBasis, UnitCosts};
use super::engine::{DispatchOutcome, DispatchRecord};
use super::renewable::{Allocation, RenewableOutput};
use super::shortfall::ShortfallSeries;
use super::types::{DEFAULT_LIFETIME_YEARS, SimConfig, TechnologyUnit, UnitKind};

/// Non-leap year used to turn an hour index into a calendar label.
const LABEL_YEAR: i32 = 2019;

/// Calendar label `MM-DD HH:00` of an hour of the year.
///
/// # Examples
///
/// ```
/// use dispatch_sim::sim::summary::period_label;
///
/// assert_eq!(period_label(0), "01-01 00:00");
/// assert_eq!(period_label(8759), "12-31 23:00");
/// ```
pub fn period_label(hour: usize) -> String {
    NaiveDate::from_ymd_opt(LABEL_YEAR, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|start| {
            (start + TimeDelta::hours(hour as i64))
                .format("%m-%d %H:00")
                .to_string()
        })
        .unwrap_or_default()
}

/// A value tied to the hour it occurred in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourValue {
    pub hour: usize,
    pub value: f64,
    pub label: String,
}

impl HourValue {
    fn new(hour: usize, value: f64) -> Self {
        Self {
            hour,
            value,
            label: period_label(hour),
        }
    }
}

/// Summary row of one unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitSummary {
    pub name: String,
    pub kind: UnitKind,
    pub zone: Option<String>,
    /// Rated capacity after the multiplier (MW, MWh for storage).
    pub capacity: f64,
    /// Energy credited towards the load (MWh).
    pub to_meet_load: f64,
    /// Energy produced (MWh).
    pub subtotal: f64,
    pub capacity_factor: Option<f64>,
    #[serde(flatten)]
    pub costs: UnitCosts,
    pub emissions: f64,
    pub emissions_cost: f64,
    pub lcoe_with_carbon: Option<f64>,
    pub lifetime_cost: Option<f64>,
    pub lifetime_emissions: f64,
    pub lifetime_emissions_cost: f64,
    pub area: Option<f64>,
    pub max_output: f64,
    /// Highest state of charge (storage only).
    pub peak_balance: Option<f64>,
    pub hours_running: usize,
}

impl UnitSummary {
    /// Energy the unit's costs and emissions are charged on.
    pub fn basis(&self) -> f64 {
        if self.kind == UnitKind::Storage {
            self.to_meet_load
        } else {
            self.subtotal
        }
    }
}

/// Aggregate figures over a set of summary rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Totals {
    pub capacity: f64,
    pub to_meet_load: f64,
    /// Energy produced by non-storage units.
    pub generation: f64,
    pub annual_cost: f64,
    pub lcog: Option<f64>,
    pub lcoe: Option<f64>,
    pub lcoe_with_carbon: Option<f64>,
    pub emissions: f64,
    pub emissions_cost: f64,
    pub capital_cost: f64,
    pub lifetime_cost: f64,
    pub lifetime_emissions: f64,
    pub lifetime_emissions_cost: f64,
    pub area: f64,
    /// Present only when a carbon price is set.
    pub cost_with_carbon: Option<f64>,
    pub lifetime_cost_with_carbon: Option<f64>,
    pub renewable_energy: f64,
    pub renewable_pct: Option<f64>,
    pub storage_energy: f64,
    pub storage_pct: Option<f64>,
    pub load: f64,
    pub load_met: f64,
    pub load_met_pct: Option<f64>,
    pub shortfall: f64,
    pub shortfall_pct: Option<f64>,
    pub surplus: f64,
    pub surplus_pct: Option<f64>,
    pub renewable_pct_of_load: Option<f64>,
    pub storage_losses: f64,
    pub largest_shortfall: Option<HourValue>,
    pub peak_load: Option<HourValue>,
}

struct TotalsContext<'a> {
    load: &'a [f64],
    shortfall: &'a ShortfallSeries,
    storage_losses: f64,
    carbon_price: f64,
    max_lifetime: f64,
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    (den > 0.0).then(|| num / den)
}

impl Totals {
    fn compute(rows: &[&UnitSummary], ctx: &TotalsContext<'_>) -> Self {
        let mut t = Totals::default();
        let mut non_renewable = 0.0;
        for row in rows {
            t.capacity += row.capacity;
            t.to_meet_load += row.to_meet_load;
            match row.kind {
                UnitKind::Storage => t.storage_energy += row.to_meet_load,
                UnitKind::Generator => {
                    non_renewable += row.basis();
                    t.generation += row.subtotal;
                }
                _ => t.generation += row.subtotal,
            }
            t.annual_cost += row.costs.annual_cost.unwrap_or(0.0);
            t.capital_cost += row.costs.capital_cost.unwrap_or(0.0);
            t.emissions += row.emissions;
            t.emissions_cost += row.emissions_cost;
            t.lifetime_cost += row.lifetime_cost.unwrap_or(0.0);
            t.lifetime_emissions += row.lifetime_emissions;
            t.lifetime_emissions_cost += row.lifetime_emissions_cost;
            t.area += row.area.unwrap_or(0.0);
        }

        t.lcog = ratio(t.annual_cost, t.generation);
        t.lcoe = ratio(t.annual_cost, t.to_meet_load);
        t.lcoe_with_carbon = ratio(t.annual_cost + t.emissions_cost, t.to_meet_load);
        if ctx.carbon_price > 0.0 {
            let carbon = t.emissions * ctx.carbon_price;
            t.cost_with_carbon = Some(t.annual_cost + carbon);
            t.lifetime_cost_with_carbon = Some(t.lifetime_cost + carbon * ctx.max_lifetime);
        }

        t.renewable_energy = t.to_meet_load - t.storage_energy - non_renewable;
        t.renewable_pct = ratio(t.renewable_energy, t.to_meet_load);
        t.storage_pct = ratio(t.storage_energy, t.to_meet_load);

        t.load = ctx.load.iter().sum();
        t.shortfall = ctx.shortfall.deficit_total();
        t.surplus = ctx.shortfall.surplus_total();
        t.load_met = t.load - t.shortfall;
        t.load_met_pct = ratio(t.load_met, t.load);
        t.shortfall_pct = ratio(t.shortfall, t.load);
        t.surplus_pct = ratio(t.surplus, t.load);
        t.renewable_pct_of_load = ratio(t.load - t.shortfall - non_renewable, t.load);
        t.storage_losses = ctx.storage_losses;
        t.largest_shortfall = ctx
            .shortfall
            .largest_deficit()
            .map(|(hour, value)| HourValue::new(hour, value));
        t.peak_load = ctx
            .load
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (h, l)| match best {
                Some((_, b)) if b >= l => best,
                _ => Some((h, l)),
            })
            .map(|(hour, value)| HourValue::new(hour, value));
        t
    }
}

/// Complete economic and energy summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub year: i32,
    pub discount_rate: f64,
    pub carbon_price: f64,
    /// Longest lifetime among the included units; scales lifetime figures.
    pub max_lifetime: f64,
    pub units: Vec<UnitSummary>,
    pub totals: Totals,
    pub underlying_units: Vec<UnitSummary>,
    /// Totals with underlying generation added to the load.
    pub underlying_totals: Option<Totals>,
    pub correlation: Vec<CorrelationEntry>,
}

/// Everything the aggregator reads.
pub struct SummaryInputs<'a> {
    pub config: &'a SimConfig,
    pub units: &'a [TechnologyUnit],
    pub load: &'a [f64],
    pub renewables: &'a [RenewableOutput],
    pub allocation: &'a Allocation,
    pub underlying: &'a [RenewableOutput],
    pub outcome: &'a DispatchOutcome,
}

struct RowSource<'a> {
    name: &'a str,
    kind: UnitKind,
    capacity: f64,
    to_meet_load: f64,
    subtotal: f64,
    max_output: f64,
    peak_balance: Option<f64>,
    hours_running: usize,
}

/// Builds the [`Summary`] from the outputs of the allocator and the engine.
pub struct SummaryAggregator;

impl SummaryAggregator {
    /// Computes per-unit rows and totals.
    ///
    /// Units are looked up by name in `inputs.units` for their economics; a
    /// row without a matching unit is treated as zero-cost.
    pub fn summarise(inputs: &SummaryInputs<'_>) -> Summary {
        let mut sources = Vec::new();
        for (src, tml) in inputs
            .renewables
            .iter()
            .zip(&inputs.allocation.to_meet_load)
        {
            sources.push(RowSource {
                name: &src.name,
                kind: src.kind,
                capacity: src.capacity,
                to_meet_load: *tml,
                subtotal: src.total(),
                max_output: src.max_output(),
                peak_balance: None,
                hours_running: src.hours_running(),
            });
        }
        for record in &inputs.outcome.records {
            let source = match record {
                DispatchRecord::Generator(g) => RowSource {
                    name: &g.name,
                    kind: UnitKind::Generator,
                    capacity: g.capacity,
                    to_meet_load: g.total(),
                    subtotal: g.total(),
                    max_output: g.max_output(),
                    peak_balance: None,
                    hours_running: g.hours_running(),
                },
                DispatchRecord::Storage(s) => RowSource {
                    name: &s.name,
                    kind: UnitKind::Storage,
                    capacity: s.capacity,
                    to_meet_load: s.total_discharge(),
                    subtotal: s.total_discharge(),
                    max_output: s.peak_discharge(),
                    peak_balance: Some(s.peak_level()),
                    hours_running: s.hours_discharging(),
                },
            };
            sources.push(source);
        }
        let underlying_sources: Vec<RowSource<'_>> = inputs
            .underlying
            .iter()
            .map(|src| RowSource {
                name: &src.name,
                kind: src.kind,
                capacity: src.capacity,
                to_meet_load: src.total(),
                subtotal: src.total(),
                max_output: src.max_output(),
                peak_balance: None,
                hours_running: src.hours_running(),
            })
            .collect();

        let storage_total: f64 = sources
            .iter()
            .filter(|s| s.kind == UnitKind::Storage)
            .map(|s| s.to_meet_load)
            .sum();
        let renewable_total: f64 = sources
            .iter()
            .filter(|s| s.kind == UnitKind::Renewable)
            .map(|s| s.to_meet_load)
            .sum();
        let max_lifetime = sources
            .iter()
            .chain(&underlying_sources)
            .filter_map(|s| inputs.units.iter().find(|u| u.name == s.name))
            .map(|u| u.economics.lifetime_years())
            .fold(None, |acc: Option<f64>, l| Some(acc.map_or(l, |a| a.max(l))))
            .unwrap_or(DEFAULT_LIFETIME_YEARS);

        let row = |src: &RowSource<'_>, lcoe_energy: f64| {
            Self::unit_row(inputs, src, lcoe_energy, max_lifetime)
        };
        let units: Vec<UnitSummary> = sources
            .iter()
            .map(|src| {
                let lcoe_energy = if src.kind == UnitKind::Renewable && renewable_total > 0.0 {
                    src.to_meet_load + storage_total * src.to_meet_load / renewable_total
                } else {
                    src.to_meet_load
                };
                row(src, lcoe_energy)
            })
            .collect();
        let underlying_units: Vec<UnitSummary> = underlying_sources
            .iter()
            .map(|src| row(src, src.to_meet_load))
            .collect();

        let storage_losses: f64 = inputs
            .outcome
            .storage_records()
            .map(|s| s.total_losses())
            .sum();
        let shortfall = &inputs.outcome.shortfall;
        let main_rows: Vec<&UnitSummary> = units.iter().collect();
        let totals = Totals::compute(
            &main_rows,
            &TotalsContext {
                load: inputs.load,
                shortfall,
                storage_losses,
                carbon_price: inputs.config.carbon_price,
                max_lifetime,
            },
        );

        let underlying_totals = (!underlying_units.is_empty()).then(|| {
            let mut load = inputs.load.to_vec();
            for src in inputs.underlying {
                for (l, o) in load.iter_mut().zip(&src.output) {
                    *l += o;
                }
            }
            let all_rows: Vec<&UnitSummary> = units.iter().chain(&underlying_units).collect();
            Totals::compute(
                &all_rows,
                &TotalsContext {
                    load: &load,
                    shortfall,
                    storage_losses,
                    carbon_price: inputs.config.carbon_price,
                    max_lifetime,
                },
            )
        });

        let hours = inputs.load.len();
        let mut discharge = vec![0.0; hours];
        for s in inputs.outcome.storage_records() {
            for (d, x) in discharge.iter_mut().zip(&s.discharge) {
                *d += x;
            }
        }
        let met: Vec<f64> = inputs
            .load
            .iter()
            .zip(shortfall.as_slice())
            .map(|(&l, &s)| if s < 0.0 { l } else { l - s })
            .collect();
        let correlation = correlation_report(
            inputs.load,
            &inputs.allocation.contribution,
            &discharge,
            &met,
        );

        Summary {
            year: inputs.config.year,
            discount_rate: inputs.config.discount_rate,
            carbon_price: inputs.config.carbon_price,
            max_lifetime,
            units,
            totals,
            underlying_units,
            underlying_totals,
            correlation,
        }
    }

    fn unit_row(
        inputs: &SummaryInputs<'_>,
        src: &RowSource<'_>,
        lcoe_energy: f64,
        max_lifetime: f64,
    ) -> UnitSummary {
        let unit = inputs.units.iter().find(|u| u.name == src.name);
        let basis = if src.kind == UnitKind::Storage {
            src.to_meet_load
        } else {
            src.subtotal
        };
        let cost_basis = CostBasis {
            capacity: src.capacity,
            basis,
            lcoe_energy,
        };
        let mut row = UnitSummary {
            name: src.name.to_string(),
            kind: src.kind,
            zone: unit.and_then(|u| u.zone()).map(str::to_string),
            capacity: src.capacity,
            to_meet_load: src.to_meet_load,
            subtotal: src.subtotal,
            capacity_factor: cost_basis.capacity_factor(),
            costs: UnitCosts::zero(),
            emissions: 0.0,
            emissions_cost: 0.0,
            lcoe_with_carbon: Some(0.0),
            lifetime_cost: Some(0.0),
            lifetime_emissions: 0.0,
            lifetime_emissions_cost: 0.0,
            area: None,
            max_output: src.max_output,
            peak_balance: src.peak_balance,
            hours_running: src.hours_running,
        };
        let Some(unit) = unit else {
            return row;
        };
        row.area = (unit.economics.area > 0.0).then(|| src.capacity * unit.economics.area);
        if inputs.config.remove_cost_when_idle && basis == 0.0 {
            row.costs = UnitCosts::idle();
            row.lcoe_with_carbon = None;
            row.lifetime_cost = None;
            return row;
        }

        row.costs = economics::unit_costs(
            &unit.pricing,
            &unit.economics,
            inputs.config.discount_rate,
            cost_basis,
        );
        let emissions = economics::emissions(
            unit.economics.emissions,
            inputs.config.carbon_price,
            basis,
            src.to_meet_load,
            row.costs.annual_cost,
            row.costs.lcoe,
        );
        row.emissions = emissions.tonnes;
        row.emissions_cost = emissions.cost;
        row.lcoe_with_carbon = emissions.lcoe_with_carbon;
        row.lifetime_cost = row.costs.annual_cost.map(|c| c * max_lifetime);
        row.lifetime_emissions = emissions.tonnes * max_lifetime;
        row.lifetime_emissions_cost = row.lifetime_emissions * inputs.config.carbon_price;
        row
    }
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[UnitSummary]) -> fmt::Result {
    writeln!(
        f,
        "{:<24} {:>10} {:>14} {:>14} {:>7} {:>14} {:>9} {:>9} {:>12}",
        "Unit", "Capacity", "To meet load", "Subtotal", "CF", "Annual cost", "LCOG", "LCOE", "Emissions"
    )?;
    for r in rows {
        writeln!(
            f,
            "{:<24} {:>10.1} {:>14.0} {:>14.0} {:>7} {:>14} {:>9} {:>9} {:>12.0}",
            r.name,
            r.capacity,
            r.to_meet_load,
            r.subtotal,
            pct(r.capacity_factor),
            opt(r.costs.annual_cost, 0),
            opt(r.costs.lcog, 2),
            opt(r.costs.lcoe, 2),
            r.emissions
        )?;
    }
    Ok(())
}

fn write_totals(f: &mut fmt::Formatter<'_>, title: &str, t: &Totals, year: i32) -> fmt::Result {
    writeln!(
        f,
        "{:<24} {:>10.1} {:>14.0} {:>14.0} {:>7} {:>14.0} {:>9} {:>9} {:>12.0}",
        format!("{title}Total"),
        t.capacity,
        t.to_meet_load,
        t.generation,
        "",
        t.annual_cost,
        opt(t.lcog, 2),
        opt(t.lcoe, 2),
        t.emissions
    )?;
    if let Some(cost) = t.cost_with_carbon {
        writeln!(f, "{title}Total incl. carbon cost: {cost:.0} (LCOE {})", opt(t.lcoe_with_carbon, 2))?;
    }
    writeln!(f, "Capital cost:          {:.0}", t.capital_cost)?;
    writeln!(
        f,
        "Lifetime cost:         {:.0} ({:.0} tCO2e)",
        t.lifetime_cost, t.lifetime_emissions
    )?;
    writeln!(f, "RE %:                  {}", pct(t.renewable_pct))?;
    if t.storage_energy > 0.0 {
        writeln!(f, "Storage %:             {}", pct(t.storage_pct))?;
    }
    writeln!(f, "--- {title}Load Analysis ---")?;
    writeln!(f, "Load met:              {} ({:.0} MWh)", pct(t.load_met_pct), t.load_met)?;
    writeln!(f, "Shortfall:             {} ({:.0} MWh)", pct(t.shortfall_pct), t.shortfall)?;
    write!(f, "Total {title}load ({year}): {:.0} MWh", t.load)?;
    match &t.peak_load {
        Some(peak) => writeln!(f, ", peak {:.1} MW ({})", peak.value, peak.label)?,
        None => writeln!(f)?,
    }
    writeln!(f, "RE % of total load:    {}", pct(t.renewable_pct_of_load))?;
    if t.storage_losses != 0.0 {
        writeln!(f, "Storage losses:        {:.0} MWh", t.storage_losses)?;
    }
    writeln!(f, "Surplus:               {} ({:.0} MWh)", pct(t.surplus_pct), t.surplus)?;
    if let Some(largest) = &t.largest_shortfall {
        writeln!(f, "Largest shortfall:     {:.2} MW ({})", largest.value, largest.label)?;
    }
    Ok(())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Dispatch Summary ---")?;
        write_rows(f, &self.units)?;
        write_totals(f, "", &self.totals, self.year)?;
        if let Some(totals) = &self.underlying_totals {
            writeln!(f, "--- Additional Underlying Load ---")?;
            write_rows(f, &self.underlying_units)?;
            write_totals(f, "Underlying ", totals, self.year)?;
        }
        writeln!(f, "--- Correlation To Load ---")?;
        for entry in &self.correlation {
            writeln!(
                f,
                "{:<24} {:>7.3} {}",
                entry.source, entry.coefficient, entry.strength
            )?;
        }
        writeln!(f, "--- Static Variables ---")?;
        if self.carbon_price > 0.0 {
            writeln!(f, "Carbon price ($/tCO2e): {:.2}", self.carbon_price)?;
        }
        writeln!(f, "Lifetime (years):       {:.0}", self.max_lifetime)?;
        write!(f, "Discount rate:          {:.2}%", self.discount_rate * 100.0)
    }
}
