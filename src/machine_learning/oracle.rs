use crate::ModelError;
use ndarray::ArrayView1;

/// The opaque, already trained classifier a TREPAN tree approximates.
///
/// Only `classify` is needed to grow a tree; `class_distribution` is part of the
/// contract so callers can inspect the oracle on the same footing as the tree.
/// Implementations must be deterministic for reproducible extraction.
pub trait Oracle {
    /// Predicts the class index of one instance.
    ///
    /// # Parameters
    ///
    /// * `instance` - Attribute values of the instance, nominal values given by their code
    ///
    /// # Returns
    ///
    /// * `Result<usize, ModelError>` - The predicted class index, or `OracleError` if the oracle fails
    fn classify(&self, instance: ArrayView1<f64>) -> Result<usize, ModelError>;

    /// Predicts the class distribution of one instance.
    ///
    /// # Parameters
    ///
    /// * `instance` - Attribute values of the instance, nominal values given by their code
    ///
    /// # Returns
    ///
    /// * `Result<Vec<f64>, ModelError>` - One probability per class, or `OracleError` if the oracle fails
    fn class_distribution(&self, instance: ArrayView1<f64>) -> Result<Vec<f64>, ModelError>;
}

impl<O: Oracle + ?Sized> Oracle for &O {
    fn classify(&self, instance: ArrayView1<f64>) -> Result<usize, ModelError> {
        (**self).classify(instance)
    }

    fn class_distribution(&self, instance: ArrayView1<f64>) -> Result<Vec<f64>, ModelError> {
        (**self).class_distribution(instance)
    }
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn classify(&self, instance: ArrayView1<f64>) -> Result<usize, ModelError> {
        (**self).classify(instance)
    }

    fn class_distribution(&self, instance: ArrayView1<f64>) -> Result<Vec<f64>, ModelError> {
        (**self).class_distribution(instance)
    }
}

/// An oracle backed by a plain decision function.
///
/// The class distribution is one-hot on the predicted class.
///
/// # Example
/// ```rust
/// use trepan::machine_learning::{Oracle, RuleOracle};
/// use ndarray::array;
///
/// let oracle = RuleOracle::new(2, |x| (x[0] <= 5.0) as usize);
/// assert_eq!(oracle.classify(array![3.0].view()).unwrap(), 1);
/// assert_eq!(oracle.class_distribution(array![7.0].view()).unwrap(), vec![1.0, 0.0]);
/// ```
pub struct RuleOracle<F> {
    n_classes: usize,
    rule: F,
}

impl<F> RuleOracle<F> {
    /// Wraps `rule`, which must answer with a class index below `n_classes`.
    pub fn new(n_classes: usize, rule: F) -> Self
    where
        F: Fn(ArrayView1<f64>) -> usize,
    {
        Self { n_classes, rule }
    }

    pub fn get_n_classes(&self) -> usize {
        self.n_classes
    }
}

impl<F> Oracle for RuleOracle<F>
where
    F: Fn(ArrayView1<f64>) -> usize,
{
    fn classify(&self, instance: ArrayView1<f64>) -> Result<usize, ModelError> {
        let class = (self.rule)(instance);
        if class >= self.n_classes {
            return Err(ModelError::OracleError(format!(
                "rule returned class {} but only {} classes exist",
                class, self.n_classes
            )));
        }
        Ok(class)
    }

    fn class_distribution(&self, instance: ArrayView1<f64>) -> Result<Vec<f64>, ModelError> {
        let class = self.classify(instance)?;
        let mut distribution = vec![0.0; self.n_classes];
        distribution[class] = 1.0;
        Ok(distribution)
    }
}
