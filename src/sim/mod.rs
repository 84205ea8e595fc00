/// Load correlation report.
pub mod correlation;
/// Annualised cost and emissions.
pub mod economics;
pub mod engine;
pub mod generator;
/// Renewable allocation ahead of the merit order.
pub mod renewable;
pub mod shortfall;
/// Storage state machine and hourly simulation.
pub mod storage;
pub mod summary;
pub mod types;

pub use engine::{DispatchEngine, DispatchOutcome, DispatchRecord};
pub use renewable::{Allocation, RenewableAllocator, RenewableOutput};
pub use shortfall::ShortfallSeries;
pub use summary::{Summary, SummaryAggregator, SummaryInputs};
pub use types::{DispatchPlan, SimConfig, TechnologyUnit, UnitKind};
