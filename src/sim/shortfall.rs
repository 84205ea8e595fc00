//! The hourly shortfall series threaded through every dispatch stage.

use std::ops::{Index, IndexMut};

use serde::Serialize;

/// Hourly shortfall: positive = unmet load (MW), negative = surplus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortfallSeries(Vec<f64>);

impl ShortfallSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Adds `delta` to every hour.
    pub fn shift(&mut self, delta: f64) {
        for v in &mut self.0 {
            *v += delta;
        }
    }

    /// Whether hours `hour + 1 ..= hour + window` all exist and are in deficit.
    pub fn deficit_persists(&self, hour: usize, window: usize) -> bool {
        let end = hour + window;
        end < self.0.len() && self.0[hour + 1..=end].iter().all(|&s| s > 0.0)
    }

    /// Sum of positive hours.
    pub fn deficit_total(&self) -> f64 {
        self.0.iter().filter(|&&s| s > 0.0).sum()
    }

    /// Sum of negative hours, as a positive magnitude.
    pub fn surplus_total(&self) -> f64 {
        -self.0.iter().filter(|&&s| s < 0.0).sum::<f64>()
    }

    /// Hour and value of the largest deficit, if any hour is in deficit.
    pub fn largest_deficit(&self) -> Option<(usize, f64)> {
        self.0
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, s)| s > 0.0)
            .fold(None, |best, (h, s)| match best {
                Some((_, b)) if b >= s => best,
                _ => Some((h, s)),
            })
    }
}

impl Index<usize> for ShortfallSeries {
    type Output = f64;

    fn index(&self, hour: usize) -> &f64 {
        &self.0[hour]
    }
}

impl IndexMut<usize> for ShortfallSeries {
    fn index_mut(&mut self, hour: usize) -> &mut f64 {
        &mut self.0[hour]
    }
}
