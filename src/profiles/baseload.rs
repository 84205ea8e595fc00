use rand::{SeedableRng, rngs::StdRng};

use super::types::{Profile, gaussian_noise, year_pos};

/// Demand with a daily sinusoid, a seasonal swing, and Gaussian noise.
///
/// # Examples
///
/// ```
/// use dispatch_sim::profiles::{BaseLoad, Profile};
///
/// let mut load = BaseLoad::new(
///     800.0, // base_mw - average demand
///     150.0, // daily_amp_mw
///     100.0, // seasonal_amp_mw - peak at the start of the year
///     0.0,   // phase_rad
///     0.0,   // noise_std
///     42,    // seed
/// );
/// assert!(load.value(6) > 800.0);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLoad {
    /// Average demand (MW).
    pub base_mw: f64,
    /// Amplitude of the daily sinusoid (MW).
    pub daily_amp_mw: f64,
    /// Amplitude of the yearly cosine (MW).
    pub seasonal_amp_mw: f64,
    /// Phase of the daily sinusoid (radians).
    pub phase_rad: f64,
    /// Standard deviation of the noise (MW).
    pub noise_std: f64,
    rng: StdRng,
}

impl BaseLoad {
    pub fn new(
        base_mw: f64,
        daily_amp_mw: f64,
        seasonal_amp_mw: f64,
        phase_rad: f64,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        Self {
            base_mw,
            daily_amp_mw,
            seasonal_amp_mw,
            phase_rad,
            noise_std: noise_std.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A constant level.
    pub fn flat(level_mw: f64) -> Self {
        Self::new(level_mw, 0.0, 0.0, 0.0, 0.0, 0)
    }
}

impl Profile for BaseLoad {
    /// Never negative.
    fn value(&mut self, hour: usize) -> f64 {
        let tau = 2.0 * std::f64::consts::PI;
        let day_pos = (hour % 24) as f64 / 24.0;
        let daily = self.daily_amp_mw * (tau * day_pos + self.phase_rad).sin();
        let seasonal = self.seasonal_amp_mw * (tau * year_pos(hour)).cos();
        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        (self.base_mw + daily + seasonal + noise).max(0.0)
    }

    fn profile_type(&self) -> &'static str {
        "baseload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::generate;

    #[test]
    fn flat_is_constant() {
        let mut p = BaseLoad::flat(60.0);
        assert!(generate(&mut p, 48).iter().all(|&v| v == 60.0));
    }

    #[test]
    fn never_negative() {
        let mut p = BaseLoad::new(10.0, 50.0, 0.0, 0.0, 5.0, 3);
        assert!(generate(&mut p, 24 * 30).iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn same_seed_same_series() {
        let mut a = BaseLoad::new(500.0, 100.0, 50.0, 0.3, 20.0, 42);
        let mut b = BaseLoad::new(500.0, 100.0, 50.0, 0.3, 20.0, 42);
        assert_eq!(generate(&mut a, 200), generate(&mut b, 200));
    }

    #[test]
    fn daily_shape_peaks_at_quarter_day() {
        let mut p = BaseLoad::new(100.0, 20.0, 0.0, 0.0, 0.0, 0);
        let day = generate(&mut p, 24);
        assert!((day[6] - 120.0).abs() < 1e-9);
        assert!((day[18] - 80.0).abs() < 1e-9);
    }
}
