use super::instances::{AttributeKind, Instances};
use crate::ModelError;

/// Performs the construction-time checks a dataset must pass before a tree is built.
///
/// This function validates that:
/// - The dataset is not empty
/// - The class attribute is nominal with at least one value
/// - No string attribute is present
/// - No value is missing (NaN) or infinite
/// - Nominal values and class labels are codes inside their domain
///
/// # Parameters
///
/// * `data` - The dataset to validate
///
/// # Returns
///
/// - `Ok(())` - If all validation checks pass
/// - `Err(ModelError::InputValidationError)` - If any validation check fails, with an informative error message
pub fn preliminary_check(data: &Instances) -> Result<(), ModelError> {
    if data.num_instances() == 0 {
        return Err(ModelError::InputValidationError(
            "No training instances".to_string(),
        ));
    }

    if !data.class_attribute().is_nominal() || data.num_classes() == 0 {
        return Err(ModelError::InputValidationError(format!(
            "Class attribute '{}' must be nominal",
            data.class_attribute().name()
        )));
    }

    if let Some(attribute) = data
        .attributes()
        .iter()
        .find(|a| matches!(a.kind(), AttributeKind::String))
    {
        return Err(ModelError::InputValidationError(format!(
            "String attribute '{}' is not supported",
            attribute.name()
        )));
    }

    for (i, row) in data.x().outer_iter().enumerate() {
        for (j, &val) in row.iter().enumerate() {
            if val.is_nan() || val.is_infinite() {
                return Err(ModelError::InputValidationError(format!(
                    "Input data contains missing or infinite value at position [{}][{}]",
                    i, j
                )));
            }

            let attribute = &data.attributes()[j];
            if attribute.is_nominal() {
                check_nominal_code(val, attribute.num_values()).map_err(|_| {
                    ModelError::InputValidationError(format!(
                        "Value {} at position [{}][{}] is not a code of nominal attribute '{}'",
                        val,
                        i,
                        j,
                        attribute.name()
                    ))
                })?;
            }
        }
    }

    let n_classes = data.num_classes();
    if let Some((i, &label)) = data.y().iter().enumerate().find(|&(_, &l)| l >= n_classes) {
        return Err(ModelError::InputValidationError(format!(
            "Class label {} of instance {} exceeds the {} classes of '{}'",
            label,
            i,
            n_classes,
            data.class_attribute().name()
        )));
    }

    Ok(())
}

/// Checks that `value` is a whole code in `0..num_values` and returns it.
pub fn check_nominal_code(value: f64, num_values: usize) -> Result<usize, ModelError> {
    if value < 0.0 || value.fract() != 0.0 || value >= num_values as f64 {
        return Err(ModelError::TreeError("Nominal value has no matching branch"));
    }
    Ok(value as usize)
}

/// Validates that the proportion threshold lies in (0, 1].
///
/// # Parameters
///
/// * `proportion_threshold` - Majority-class proportion above which a node becomes a leaf
///
/// # Returns
///
/// - `Ok(())` - If the threshold is valid
/// - `Err(ModelError::InputValidationError)` - If the threshold is not positive, above 1, or NaN
pub fn validate_proportion_threshold(proportion_threshold: f64) -> Result<(), ModelError> {
    if !(proportion_threshold > 0.0 && proportion_threshold <= 1.0) {
        return Err(ModelError::InputValidationError(format!(
            "proportion_threshold must be in (0, 1], got {}",
            proportion_threshold
        )));
    }

    Ok(())
}
