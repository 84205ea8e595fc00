//! Synthetic hourly profiles for scenarios without a series file.

pub mod baseload;
pub mod solar;
pub mod types;
pub mod wind;

pub use baseload::BaseLoad;
pub use solar::SolarPv;
pub use types::{Profile, generate};
pub use wind::Wind;

use crate::config::ProfileConfig;
use crate::sim::types::HOURS_PER_YEAR;

/// Builds the profile described by `config`.
///
/// `capacity` scales the solar and wind shapes; load shapes are absolute.
pub fn build(config: &ProfileConfig, capacity: f64, seed: u64) -> Box<dyn Profile> {
    match *config {
        ProfileConfig::Flat { level } => Box::new(BaseLoad::flat(level)),
        ProfileConfig::Sinusoid {
            base,
            daily_amp,
            seasonal_amp,
            phase_rad,
            noise_std,
        } => Box::new(BaseLoad::new(
            base,
            daily_amp,
            seasonal_amp,
            phase_rad,
            noise_std,
            seed,
        )),
        ProfileConfig::Solar {
            sunrise,
            sunset,
            seasonal_swing,
            noise_std,
        } => Box::new(SolarPv::new(
            capacity,
            sunrise,
            sunset,
            seasonal_swing,
            noise_std,
            seed,
        )),
        ProfileConfig::Wind {
            mean_cf,
            alpha,
            noise_std,
        } => Box::new(Wind::new(capacity, mean_cf, alpha, noise_std, seed)),
    }
}

/// A full year of the profile described by `config`.
pub fn year_series(config: &ProfileConfig, capacity: f64, seed: u64) -> Vec<f64> {
    let mut profile = build(config, capacity, seed);
    generate(profile.as_mut(), HOURS_PER_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_series_has_every_hour() {
        let series = year_series(&ProfileConfig::Flat { level: 5.0 }, 0.0, 1);
        assert_eq!(series.len(), HOURS_PER_YEAR);
    }

    #[test]
    fn build_picks_matching_profile() {
        let wind = ProfileConfig::Wind {
            mean_cf: 0.3,
            alpha: 0.9,
            noise_std: 0.1,
        };
        assert_eq!(build(&wind, 10.0, 1).profile_type(), "wind");
        let solar = ProfileConfig::Solar {
            sunrise: 6,
            sunset: 18,
            seasonal_swing: 0.2,
            noise_std: 0.0,
        };
        assert_eq!(build(&solar, 10.0, 1).profile_type(), "solar");
    }
}
