//! Merit-order dispatch of generation and storage against an hourly load.

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
/// Synthetic hourly profiles.
pub mod profiles;
pub mod runner;
pub mod series;
/// Allocation, dispatch engine, storage, economics, and summary modules.
pub mod sim;
