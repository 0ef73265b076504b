use crate::machine_learning::instances::{Attribute, AttributeKind};
use std::fmt;

pub mod nominal_estimator;
pub mod numeric_estimator;

pub use nominal_estimator::NominalEstimator;
pub use numeric_estimator::NumericEstimator;

/// Quantization grain of numeric attributes when synthesizing values.
pub const DEFAULT_NUMERIC_PRECISION: f64 = 0.01;

/// Capability set shared by the per-attribute probability models.
pub trait DensityEstimator {
    /// Adds an observed value with the given weight. A zero weight is ignored.
    ///
    /// # Parameters
    ///
    /// - `value` - Observed value (the code of a nominal value)
    /// - `weight` - Weight of the observation
    fn add_value(&mut self, value: f64, weight: f64);

    /// Estimated probability of `value`.
    fn probability(&self, value: f64) -> f64;

    /// Draws a value from the estimated distribution.
    ///
    /// The draw depends only on the estimator state and `seed`. Returns NaN when
    /// no mass has been observed.
    fn sample(&self, seed: u64) -> f64;
}

/// Estimator selected by the kind of the attribute it models.
///
/// # Variants
///
/// - `Nominal` - Symbol counts over the attribute's domain
/// - `Numeric` - Gaussian kernels around the observed values
#[derive(Debug, Clone, PartialEq)]
pub enum Estimator {
    Nominal(NominalEstimator),
    Numeric(NumericEstimator),
}

impl Estimator {
    /// Creates an empty estimator for `attribute`.
    ///
    /// Nominal estimators start without Laplace smoothing and numeric ones use
    /// `DEFAULT_NUMERIC_PRECISION`. String attributes have no estimator.
    pub fn for_attribute(attribute: &Attribute) -> Option<Self> {
        match attribute.kind() {
            AttributeKind::Nominal { values } => {
                Some(Estimator::Nominal(NominalEstimator::new(values.len(), false)))
            }
            AttributeKind::Numeric => Some(Estimator::Numeric(NumericEstimator::new(
                DEFAULT_NUMERIC_PRECISION,
            ))),
            AttributeKind::String => None,
        }
    }
}

impl DensityEstimator for Estimator {
    fn add_value(&mut self, value: f64, weight: f64) {
        match self {
            Estimator::Nominal(e) => e.add_value(value, weight),
            Estimator::Numeric(e) => e.add_value(value, weight),
        }
    }

    fn probability(&self, value: f64) -> f64 {
        match self {
            Estimator::Nominal(e) => e.probability(value),
            Estimator::Numeric(e) => e.probability(value),
        }
    }

    fn sample(&self, seed: u64) -> f64 {
        match self {
            Estimator::Nominal(e) => e.sample(seed),
            Estimator::Numeric(e) => e.sample(seed),
        }
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimator::Nominal(e) => write!(f, "{}", e),
            Estimator::Numeric(e) => write!(f, "{}", e),
        }
    }
}
