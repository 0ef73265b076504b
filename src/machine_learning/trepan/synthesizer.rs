use crate::ModelError;
use crate::machine_learning::estimator::{DensityEstimator, Estimator};
use crate::machine_learning::instances::{Attribute, LabeledRows};
use crate::machine_learning::oracle::Oracle;
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Asks the oracle for the class of `instance` and checks it is a known class.
pub(crate) fn query_oracle<O: Oracle + ?Sized>(
    oracle: &O,
    instance: ArrayView1<f64>,
    n_classes: usize,
) -> Result<usize, ModelError> {
    let label = oracle.classify(instance)?;
    if label >= n_classes {
        return Err(ModelError::OracleError(format!(
            "oracle returned class {} but the class attribute has {} values",
            label, n_classes
        )));
    }
    Ok(label)
}

/// Fits one independent estimator per attribute on the real rows of a node.
///
/// # Returns
///
/// * `Result<Vec<Estimator>, ModelError>` - The fitted estimators, or `ProcessingError` for an attribute without an estimator
pub fn fit_estimators(
    real: &LabeledRows,
    attributes: &[Attribute],
) -> Result<Vec<Estimator>, ModelError> {
    attributes
        .iter()
        .enumerate()
        .map(|(j, attribute)| {
            let mut estimator = Estimator::for_attribute(attribute).ok_or_else(|| {
                ModelError::ProcessingError(format!(
                    "Attribute '{}' cannot be sampled",
                    attribute.name()
                ))
            })?;
            for &value in real.x.column(j) {
                estimator.add_value(value, 1.0);
            }
            Ok(estimator)
        })
        .collect()
}

/// Tops a node up to `min_samples` examples with oracle-labelled synthetic rows.
///
/// Every attribute is modelled independently from the node's real rows, so the
/// synthetic rows follow the marginals of the examples that reach the node. A
/// generator seeded with `seed` hands one fresh seed per attribute to each
/// estimator draw, which makes the result reproducible for a given node.
/// Rows with a NaN value are discarded instead of being sent to the oracle.
///
/// # Parameters
///
/// - `real` - Real examples reaching the node
/// - `attributes` - Attribute metadata, indexed like the columns of `real`
/// - `n_classes` - Number of classes
/// - `min_samples` - Number of examples the node should hold
/// - `oracle` - Classifier labelling the synthetic rows
/// - `seed` - Seed of the node's random generator
///
/// # Returns
///
/// * `Result<LabeledRows, ModelError>` - At most `min_samples - real.len()` synthetic rows,
///   empty when the node already holds enough real examples
pub fn draw_sample<O: Oracle + ?Sized>(
    real: &LabeledRows,
    attributes: &[Attribute],
    n_classes: usize,
    min_samples: usize,
    oracle: &O,
    seed: u64,
) -> Result<LabeledRows, ModelError> {
    let n_features = attributes.len();
    if real.len() >= min_samples {
        return Ok(LabeledRows::empty(n_features));
    }

    let estimators = fit_estimators(real, attributes)?;
    let requested = min_samples - real.len();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut values = Vec::with_capacity(requested * n_features);
    let mut labels = Vec::with_capacity(requested);
    let mut row = vec![0.0; n_features];

    for _ in 0..requested {
        for (slot, estimator) in row.iter_mut().zip(&estimators) {
            *slot = estimator.sample(rng.next_u64());
        }
        if row.iter().any(|v| v.is_nan()) {
            continue;
        }

        labels.push(query_oracle(oracle, ArrayView1::from(&row[..]), n_classes)?);
        values.extend_from_slice(&row);
    }

    let x = Array2::from_shape_vec((labels.len(), n_features), values)
        .map_err(|e| ModelError::ProcessingError(e.to_string()))?;
    Ok(LabeledRows::new(x, labels))
}
