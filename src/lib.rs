//! Extraction of comprehensible decision trees from opaque classifiers.
//!
//! The crate implements TREPAN: a queue-driven tree induction that treats an already
//! trained classifier (the *oracle*) as the ground truth, tops up thin nodes with
//! synthetic examples drawn from per-attribute density estimators, and splits on
//! information gain until the node budget or the stopping rules are reached.

/// A macro that generates a getter method for any field.
///
/// This macro creates a public getter method that returns the value or reference
/// of the specified field. The generated method includes appropriate documentation
/// describing the field being accessed.
///
/// # Parameters
///
/// - `$method_name` - The name of the getter method (e.g., get_min_samples)
/// - `$field_name` - The name of the field to access (e.g., min_samples)
/// - `$return_type` - The return type of the getter method
#[cfg(feature = "machine_learning")]
macro_rules! get_field {
    ($method_name:ident, $field_name:ident, $return_type:ty) => {
        #[doc = concat!("Gets the `", stringify!($field_name), "` field.\n\n")]
        #[doc = "# Returns\n\n"]
        #[doc = concat!("* `", stringify!($return_type), "` - The value of the `", stringify!($field_name), "` field")]
        pub fn $method_name(&self) -> $return_type {
            self.$field_name
        }
    };
}

/// A macro that generates a public getter method returning a reference to a field.
///
/// # Parameters
///
/// - `$method_name` - The identifier for the generated getter method name
/// - `$field_name` - The identifier of the struct field to access
/// - `$return_type` - The type expression for the return value (typically a reference type like `&Type`)
#[cfg(feature = "machine_learning")]
macro_rules! get_field_as_ref {
    ($method_name:ident, $field_name:ident, $return_type:ty) => {
        #[doc = concat!("Gets the `", stringify!($field_name), "` field.\n\n")]
        #[doc = "# Returns\n\n"]
        #[doc = concat!("* `", stringify!($return_type), "` - The value of the `", stringify!($field_name), "` field as a reference")]
        pub fn $method_name(&self) -> $return_type {
            &self.$field_name
        }
    };
}

pub(crate) use serde::{Deserialize, Serialize};

/// Error type shared by every module of the crate.
pub mod error;

pub use error::ModelError;

/// Module `math` contains the numeric helpers used by the tree induction.
///
/// # Core Functions
///
/// - `entropy_from_counts` - Entropy of a class-count vector, zero-count classes contribute nothing
/// - `information_gain` - Entropy reduction obtained by partitioning a class-count vector
/// - `standard_normal_cdf` - Cumulative distribution of the standard normal, used by the kernel estimator
/// - `max_index` - Index of the first maximum of a slice
/// - `round_to` - Rounds a value to a number of decimals for reports
///
/// # Example
/// ```rust
/// use trepan::math::{entropy_from_counts, information_gain};
///
/// let parent = [2.0, 2.0];
/// assert!((entropy_from_counts(&parent) - 1.0).abs() < 1e-12);
///
/// let gain = information_gain(&parent, &[vec![2.0, 0.0], vec![0.0, 2.0]]);
/// assert!((gain - 1.0).abs() < 1e-12);
/// ```
#[cfg(feature = "math")]
pub mod math;

/// Module `machine_learning` provides the TREPAN tree extractor and its building blocks.
///
/// # Components
///
/// - **Instances / Attribute**: tabular dataset with nominal and numeric attributes
/// - **Oracle**: the opaque classifier being explained, plus `RuleOracle` for closures
/// - **Estimators**: `NominalEstimator` (symbol counts) and `NumericEstimator` (Gaussian kernels)
///   used to synthesize plausible attribute values
/// - **Trepan**: the tree builder/scheduler, with best-first selection, pruning and fidelity
///
/// # Example
/// ```rust
/// use trepan::machine_learning::*;
/// use ndarray::{array, Array1};
///
/// let attributes = vec![
///     Attribute::nominal("a", vec!["no", "yes"]),
///     Attribute::nominal("b", vec!["x", "y", "z"]),
/// ];
/// let class = Attribute::nominal("class", vec!["neg", "pos"]);
/// let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 2.0], [1.0, 0.0]];
/// let data = Instances::new(attributes, class, x, Array1::zeros(4)).unwrap();
///
/// let oracle = RuleOracle::new(2, |row| row[0] as usize);
/// let params = TrepanParams { min_samples: 0, ..TrepanParams::default() };
/// let mut trepan = Trepan::new(oracle, Some(params)).unwrap();
/// trepan.fit(&data).unwrap();
///
/// assert_eq!(trepan.get_fidelity(), Some(1.0));
/// println!("{}", trepan.generate_tree_structure().unwrap());
/// ```
#[cfg(feature = "machine_learning")]
pub mod machine_learning;

/// A convenience module that re-exports the most commonly used types of this crate.
///
/// # Examples
/// ```rust
/// use trepan::prelude::*;
/// ```
pub mod prelude;
