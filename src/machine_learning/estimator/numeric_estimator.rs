use super::DensityEstimator;
use crate::math::standard_normal_cdf;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Maximum relative error tolerated when truncating the kernel summation
const MAX_ERROR: f64 = 0.01;

/// Kernel density estimator with one Gaussian kernel per distinct observed value.
///
/// Values are quantized to `precision` and kept sorted; repeated values share a
/// kernel whose weight grows. The bandwidth is
/// `max(range / sqrt(total weight), precision / 6)`, so it shrinks as evidence
/// accumulates but never drops below a sixth of one quantization unit.
///
/// # Fields
///
/// - `values` - Distinct quantized values, ascending
/// - `weights` - Weight of the kernel at the same position in `values`
/// - `sum_of_weights` - Total weight observed
/// - `standard_deviation` - Current kernel bandwidth
/// - `precision` - Quantization grain of the data
/// - `all_weights_one` - Whether every kernel still has unit weight
///
/// # Example
/// ```rust
/// use trepan::machine_learning::{DensityEstimator, NumericEstimator};
///
/// let mut estimator = NumericEstimator::new(0.01);
/// estimator.add_value(2.0, 1.0);
/// estimator.add_value(4.0, 1.0);
/// assert_eq!(estimator.num_kernels(), 2);
/// assert!(estimator.probability(2.0) > estimator.probability(20.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NumericEstimator {
    values: Vec<f64>,
    weights: Vec<f64>,
    sum_of_weights: f64,
    standard_deviation: f64,
    precision: f64,
    all_weights_one: bool,
}

impl NumericEstimator {
    /// Creates an empty estimator.
    ///
    /// # Parameters
    ///
    /// * `precision` - Grain to which values are rounded; with 0.1 every value in (0.25, 0.35] counts as 0.3
    pub fn new(precision: f64) -> Self {
        Self {
            values: Vec::with_capacity(50),
            weights: Vec::with_capacity(50),
            sum_of_weights: 0.0,
            standard_deviation: precision / 6.0,
            precision,
            all_weights_one: true,
        }
    }

    pub fn num_kernels(&self) -> usize {
        self.values.len()
    }

    pub fn standard_deviation(&self) -> f64 {
        self.standard_deviation
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn sum_of_weights(&self) -> f64 {
        self.sum_of_weights
    }

    fn round(&self, value: f64) -> f64 {
        (value / self.precision).round_ties_even() * self.precision
    }

    /// Mass of a kernel at distance `delta` integrated over one precision unit.
    fn kernel_mass(&self, delta: f64) -> f64 {
        let half = self.precision / 2.0;
        let z_lower = (delta - half) / self.standard_deviation;
        let z_upper = (delta + half) / self.standard_deviation;
        standard_normal_cdf(z_upper) - standard_normal_cdf(z_lower)
    }
}

impl DensityEstimator for NumericEstimator {
    fn add_value(&mut self, value: f64, weight: f64) {
        if weight == 0.0 {
            return;
        }

        let value = self.round(value);
        let index = self.values.partition_point(|&v| v < value);
        if index < self.values.len() && self.values[index] == value {
            self.weights[index] += weight;
            self.all_weights_one = false;
        } else {
            self.values.insert(index, value);
            self.weights.insert(index, weight);
            if weight != 1.0 {
                self.all_weights_one = false;
            }
        }
        self.sum_of_weights += weight;

        let range = self.values[self.values.len() - 1] - self.values[0];
        if range > 0.0 {
            // at most 3 standard deviations within one precision interval
            self.standard_deviation =
                (range / self.sum_of_weights.sqrt()).max(self.precision / 6.0);
        }
    }

    /// Sums the kernel masses around `value`.
    ///
    /// The summation walks away from the insertion point of `value` in both
    /// directions and stops on each side once the current kernel's mass times the
    /// weight still unvisited falls below 1% of the probability accumulated so far.
    fn probability(&self, value: f64) -> f64 {
        if self.values.is_empty() {
            return self.kernel_mass(value);
        }

        let start = self.values.partition_point(|&v| v < value);
        let mut sum = 0.0;
        let mut weight_sum = 0.0;

        for i in start..self.values.len() {
            let mass = self.kernel_mass(self.values[i] - value);
            sum += mass * self.weights[i];
            weight_sum += self.weights[i];
            if mass * (self.sum_of_weights - weight_sum) < sum * MAX_ERROR {
                break;
            }
        }

        for i in (0..start).rev() {
            let mass = self.kernel_mass(self.values[i] - value);
            sum += mass * self.weights[i];
            weight_sum += self.weights[i];
            if mass * (self.sum_of_weights - weight_sum) < sum * MAX_ERROR {
                break;
            }
        }

        sum / self.sum_of_weights
    }

    /// Picks a kernel proportionally to its probability and perturbs its centre
    /// by a uniformly signed offset of at most one bandwidth.
    fn sample(&self, seed: u64) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }

        let mut accumulated = Vec::with_capacity(self.values.len());
        let mut sum = 0.0;
        for &v in &self.values {
            sum += self.probability(v);
            accumulated.push(sum);
        }
        if sum <= 0.0 || sum.is_nan() {
            accumulated.clear();
            sum = 0.0;
            for &w in &self.weights {
                sum += w;
                accumulated.push(sum);
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let r = rng.random::<f64>() * sum;
        let interval = accumulated
            .iter()
            .position(|&cumulative| cumulative >= r)
            .unwrap_or(self.values.len() - 1);

        let sign = if rng.random::<f64>() < 0.5 { 1.0 } else { -1.0 };
        let offset = rng.random::<f64>() * self.standard_deviation;
        self.values[interval] + sign * offset
    }
}

impl fmt::Display for NumericEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} Normal Kernels. StandardDev = {:.4} Precision = {}",
            self.values.len(),
            self.standard_deviation,
            self.precision
        )?;
        if self.values.is_empty() {
            return writeln!(f, "Mean = 0");
        }

        write!(f, "Means =")?;
        for value in &self.values {
            write!(f, " {}", value)?;
        }
        writeln!(f)?;
        if !self.all_weights_one {
            write!(f, "Weights =")?;
            for weight in &self.weights {
                write!(f, " {}", weight)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
