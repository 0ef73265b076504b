/// Per-attribute density estimators used to synthesize attribute values.
///
/// # Variants
///
/// - `NominalEstimator` - Symbol-count estimator over a finite domain
/// - `NumericEstimator` - Gaussian kernel density estimator with a quantization precision
pub mod estimator;
mod helper_function;
pub mod instances;
pub mod oracle;
pub(crate) mod trepan;

pub use estimator::*;
pub use instances::*;
pub use oracle::*;
pub use trepan::*;
