use super::DensityEstimator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Discrete estimator based on symbol counts.
///
/// # Fields
///
/// - `counts` - Accumulated weight of every symbol of the domain
/// - `sum_of_counts` - Total accumulated weight
///
/// # Example
/// ```rust
/// use trepan::machine_learning::{DensityEstimator, NominalEstimator};
///
/// let mut estimator = NominalEstimator::new(3, false);
/// estimator.add_value(1.0, 3.0);
/// estimator.add_value(2.0, 1.0);
/// assert_eq!(estimator.probability(1.0), 0.75);
/// assert_eq!(estimator.probability(0.0), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NominalEstimator {
    counts: Vec<f64>,
    sum_of_counts: f64,
}

impl NominalEstimator {
    /// Creates an estimator over `num_symbols` symbols (codes `0..num_symbols`).
    ///
    /// # Parameters
    ///
    /// - `num_symbols` - Size of the domain
    /// - `laplace` - When `true` every count starts at 1
    pub fn new(num_symbols: usize, laplace: bool) -> Self {
        let initial = if laplace { 1.0 } else { 0.0 };
        Self {
            counts: vec![initial; num_symbols],
            sum_of_counts: initial * num_symbols as f64,
        }
    }

    pub fn num_symbols(&self) -> usize {
        self.counts.len()
    }

    pub fn sum_of_counts(&self) -> f64 {
        self.sum_of_counts
    }

    fn bucket(&self, value: f64) -> Option<usize> {
        if value.is_nan() || value < 0.0 {
            return None;
        }
        let index = value as usize;
        (index < self.counts.len()).then_some(index)
    }
}

impl DensityEstimator for NominalEstimator {
    /// Adds `weight` to the bucket of the symbol coded by `value`.
    ///
    /// Codes outside the domain are ignored.
    fn add_value(&mut self, value: f64, weight: f64) {
        if weight == 0.0 {
            return;
        }
        if let Some(index) = self.bucket(value) {
            self.counts[index] += weight;
            self.sum_of_counts += weight;
        }
    }

    fn probability(&self, value: f64) -> f64 {
        if self.sum_of_counts == 0.0 {
            return 0.0;
        }
        self.bucket(value)
            .map_or(0.0, |index| self.counts[index] / self.sum_of_counts)
    }

    /// Draws a symbol code from the cumulative distribution in domain order.
    fn sample(&self, seed: u64) -> f64 {
        if self.sum_of_counts == 0.0 || self.counts.is_empty() {
            return f64::NAN;
        }

        let mut accumulated = Vec::with_capacity(self.counts.len());
        let mut sum = 0.0;
        for &count in &self.counts {
            sum += count / self.sum_of_counts;
            accumulated.push(sum);
        }
        // rounding must not leave the draw without a bucket
        let last = accumulated.len() - 1;
        accumulated[last] = 1.0;

        let mut rng = StdRng::seed_from_u64(seed);
        let r: f64 = rng.random();
        accumulated
            .iter()
            .position(|&cumulative| cumulative >= r)
            .unwrap_or(last) as f64
    }
}

impl fmt::Display for NominalEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discrete Estimator. Counts = ")?;
        for count in &self.counts {
            write!(f, " {:.2}", count)?;
        }
        writeln!(f, " (Total = {:.2})", self.sum_of_counts)
    }
}
