//! Correlation of supply series with the load.

use std::fmt;

use serde::Serialize;

/// Pearson correlation coefficient of two equal-length series.
///
/// Returns 0 when the coefficient is undefined (fewer than two points, or a
/// constant series).
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    let r = cov / (var_a * var_b).sqrt();
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Verbal strength of a correlation coefficient, judged on `|r|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CorrelationStrength {
    None,
    LittleIfAny,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        match r.abs() {
            a if a < 0.1 => Self::None,
            a if a < 0.3 => Self::LittleIfAny,
            a if a < 0.5 => Self::Low,
            a if a < 0.7 => Self::Moderate,
            a if a < 0.9 => Self::High,
            _ => Self::VeryHigh,
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "None",
            Self::LittleIfAny => "Little if any",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very high",
        };
        f.write_str(label)
    }
}

/// One row of the correlation report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationEntry {
    pub source: String,
    pub coefficient: f64,
    pub strength: CorrelationStrength,
}

impl CorrelationEntry {
    pub fn new(source: impl Into<String>, load: &[f64], series: &[f64]) -> Self {
        let coefficient = pearson(load, series);
        Self {
            source: source.into(),
            coefficient,
            strength: CorrelationStrength::from_coefficient(coefficient),
        }
    }
}

/// Correlation of the load with renewable supply, renewable supply plus
/// storage discharge, and the energy that finally met the load.
pub fn correlation_report(
    load: &[f64],
    renewable: &[f64],
    storage_discharge: &[f64],
    met: &[f64],
) -> Vec<CorrelationEntry> {
    let with_storage: Vec<f64> = renewable
        .iter()
        .zip(storage_discharge)
        .map(|(r, s)| r + s)
        .collect();
    vec![
        CorrelationEntry::new("RE Contribution", load, renewable),
        CorrelationEntry::new("RE plus Storage", load, &with_storage),
        CorrelationEntry::new("To Meet Load", load, met),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn perfect_correlation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        assert_abs_diff_eq!(pearson(&a, &b), 1.0, epsilon = 1e-12);
        let c = [8.0, 6.0, 4.0, 2.0];
        assert_abs_diff_eq!(pearson(&a, &c), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_series_is_zero() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(pearson(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn strength_thresholds() {
        assert_eq!(CorrelationStrength::from_coefficient(0.05), CorrelationStrength::None);
        assert_eq!(
            CorrelationStrength::from_coefficient(-0.1),
            CorrelationStrength::LittleIfAny
        );
        assert_eq!(CorrelationStrength::from_coefficient(0.3), CorrelationStrength::Low);
        assert_eq!(CorrelationStrength::from_coefficient(0.69), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(-0.89), CorrelationStrength::High);
        assert_eq!(CorrelationStrength::from_coefficient(0.9), CorrelationStrength::VeryHigh);
        assert_eq!(CorrelationStrength::VeryHigh.to_string(), "Very high");
    }

    #[test]
    fn report_has_three_rows() {
        let load = [10.0, 20.0, 30.0];
        let report = correlation_report(&load, &[5.0, 10.0, 15.0], &[0.0, 0.0, 0.0], &load);
        let names: Vec<_> = report.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(names, ["RE Contribution", "RE plus Storage", "To Meet Load"]);
        assert!(report.iter().all(|e| e.strength == CorrelationStrength::VeryHigh));
    }
}
