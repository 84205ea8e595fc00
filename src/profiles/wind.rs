use rand::{SeedableRng, rngs::StdRng};

use super::types::{Profile, gaussian_noise};

/// Wind farm output from a mean-reverting AR(1) capacity factor.
///
/// The capacity factor evolves as
/// ```text
/// cf(t) = mean + alpha * (cf(t-1) - mean) + epsilon(t)
/// ```
/// clamped to [0, 1], so calm and windy spells persist for hours.
#[derive(Debug, Clone)]
pub struct Wind {
    /// Installed capacity (MW).
    pub capacity_mw: f64,
    /// Long-run capacity factor.
    pub mean_cf: f64,
    /// Persistence (0 = independent hours, 1 = frozen).
    pub alpha: f64,
    /// Standard deviation of the hourly innovation.
    pub noise_std: f64,
    cf: f64,
    rng: StdRng,
}

impl Wind {
    pub fn new(capacity_mw: f64, mean_cf: f64, alpha: f64, noise_std: f64, seed: u64) -> Self {
        let mean_cf = mean_cf.clamp(0.0, 1.0);
        Self {
            capacity_mw: capacity_mw.max(0.0),
            mean_cf,
            alpha: alpha.clamp(0.0, 1.0),
            noise_std: noise_std.max(0.0),
            cf: mean_cf,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Profile for Wind {
    fn value(&mut self, _hour: usize) -> f64 {
        let epsilon = gaussian_noise(&mut self.rng, self.noise_std);
        self.cf = (self.mean_cf + self.alpha * (self.cf - self.mean_cf) + epsilon).clamp(0.0, 1.0);
        self.capacity_mw * self.cf
    }

    fn profile_type(&self) -> &'static str {
        "wind"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::generate;

    #[test]
    fn seed_determinism() {
        let mut a = Wind::new(100.0, 0.35, 0.9, 0.08, 42);
        let mut b = Wind::new(100.0, 0.35, 0.9, 0.08, 42);
        assert_eq!(generate(&mut a, 500), generate(&mut b, 500));
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = Wind::new(100.0, 0.35, 0.9, 0.08, 42);
        let mut b = Wind::new(100.0, 0.35, 0.9, 0.08, 99);
        assert_ne!(generate(&mut a, 50), generate(&mut b, 50));
    }

    #[test]
    fn bounded_by_capacity() {
        let mut w = Wind::new(80.0, 0.5, 0.5, 0.4, 3);
        assert!(generate(&mut w, 5000).iter().all(|&v| (0.0..=80.0).contains(&v)));
    }

    #[test]
    fn no_noise_holds_mean() {
        let mut w = Wind::new(200.0, 0.3, 0.9, 0.0, 1);
        assert!(generate(&mut w, 24).iter().all(|&v| (v - 60.0).abs() < 1e-9));
    }

    #[test]
    fn long_run_mean_near_target() {
        let mut w = Wind::new(1.0, 0.35, 0.9, 0.05, 11);
        let series = generate(&mut w, 8760);
        let mean = series.iter().sum::<f64>() / series.len() as f64;
        assert!((mean - 0.35).abs() < 0.05, "mean {mean}");
    }
}
