//! Common trait and helpers for synthetic hourly profiles.

use rand::{Rng, rngs::StdRng};

use crate::sim::types::HOURS_PER_YEAR;

/// A generator of one hourly series.
pub trait Profile {
    /// Value (MW) at the given hour of the year.
    ///
    /// Called once per hour in ascending order; stochastic profiles advance
    /// their random state on every call.
    fn value(&mut self, hour: usize) -> f64;

    /// Human-readable profile name.
    fn profile_type(&self) -> &'static str;
}

/// Collects `hours` consecutive values of a profile.
pub fn generate(profile: &mut dyn Profile, hours: usize) -> Vec<f64> {
    (0..hours).map(|h| profile.value(h)).collect()
}

/// Gaussian noise with mean 0 via the Box-Muller transform.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Half-cosine daylight shape in [0, 1] for an hour of the day.
///
/// Zero outside `[sunrise, sunset)`, peaking midway between them.
pub fn daylight_frac(hour_of_day: usize, sunrise: usize, sunset: usize) -> f64 {
    if hour_of_day < sunrise || hour_of_day >= sunset {
        return 0.0;
    }
    let span = (sunset - sunrise) as f64;
    // Sample the middle of the hour so sunrise and sunset hours are not zero.
    let x = (hour_of_day - sunrise) as f64 + 0.5;
    (std::f64::consts::PI * x / span).sin().max(0.0)
}

/// Position in the year in [0, 1) for an hour index.
pub fn year_pos(hour: usize) -> f64 {
    (hour % HOURS_PER_YEAR) as f64 / HOURS_PER_YEAR as f64
}
