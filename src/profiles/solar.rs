use rand::{SeedableRng, rngs::StdRng};

use super::types::{Profile, daylight_frac, gaussian_noise, year_pos};

/// Solar farm output: half-cosine between sunrise and sunset, scaled by a
/// seasonal swing and multiplicative weather noise.
#[derive(Debug, Clone)]
pub struct SolarPv {
    /// Output at noon on the brightest day (MW).
    pub peak_mw: f64,
    /// Hour of day generation starts (inclusive).
    pub sunrise: usize,
    /// Hour of day generation stops (exclusive).
    pub sunset: usize,
    /// Share of peak lost at the darkest point of the year.
    pub seasonal_swing: f64,
    /// Standard deviation of the multiplicative noise.
    pub noise_std: f64,
    rng: StdRng,
}

impl SolarPv {
    /// # Panics
    ///
    /// Panics if `sunrise >= sunset` or `sunset > 24`.
    pub fn new(
        peak_mw: f64,
        sunrise: usize,
        sunset: usize,
        seasonal_swing: f64,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        assert!(
            sunrise < sunset && sunset <= 24,
            "sunrise must be < sunset and sunset must be <= 24"
        );
        Self {
            peak_mw: peak_mw.max(0.0),
            sunrise,
            sunset,
            seasonal_swing: seasonal_swing.clamp(0.0, 1.0),
            noise_std: noise_std.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Profile for SolarPv {
    fn value(&mut self, hour: usize) -> f64 {
        let frac = daylight_frac(hour % 24, self.sunrise, self.sunset);
        if frac <= 0.0 {
            return 0.0;
        }
        let season = (2.0 * std::f64::consts::PI * year_pos(hour)).cos();
        let seasonal = 1.0 - self.seasonal_swing * (1.0 - season) / 2.0;
        let weather = 1.0 + gaussian_noise(&mut self.rng, self.noise_std);
        (self.peak_mw * frac * seasonal * weather).clamp(0.0, self.peak_mw)
    }

    fn profile_type(&self) -> &'static str {
        "solar"
    }
}
