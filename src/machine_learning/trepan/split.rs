use crate::machine_learning::helper_function::check_nominal_code;
use crate::machine_learning::instances::{Attribute, AttributeKind, LabeledRows};
use crate::math::{information_gain, max_index};
use crate::{Deserialize, ModelError, Serialize};
use ndarray::ArrayView1;

/// Gains below this value count as no gain at all
const ZERO_GAIN: f64 = 1e-6;

/// The test an internal node applies to route an instance to one of its children.
///
/// # Variants
///
/// - `Nominal` - One branch per value of the attribute's domain
///   - `attribute`: Index of the tested attribute.
///   - `arity`: Size of the attribute's domain.
/// - `Numeric` - Two branches, branch 0 for `value <= threshold` and branch 1 otherwise
///   - `attribute`: Index of the tested attribute.
///   - `threshold`: Split point between the two branches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SplitTest {
    Nominal { attribute: usize, arity: usize },
    Numeric { attribute: usize, threshold: f64 },
}

impl SplitTest {
    /// Index of the tested attribute.
    pub fn attribute(&self) -> usize {
        match *self {
            SplitTest::Nominal { attribute, .. } | SplitTest::Numeric { attribute, .. } => {
                attribute
            }
        }
    }

    /// Number of children the test produces.
    pub fn arity(&self) -> usize {
        match *self {
            SplitTest::Nominal { arity, .. } => arity,
            SplitTest::Numeric { .. } => 2,
        }
    }

    /// Threshold of a numeric test, `None` for nominal tests.
    pub fn threshold(&self) -> Option<f64> {
        match *self {
            SplitTest::Nominal { .. } => None,
            SplitTest::Numeric { threshold, .. } => Some(threshold),
        }
    }

    /// Selects the branch `instance` follows.
    ///
    /// # Returns
    ///
    /// * `Result<usize, ModelError>` - The branch index, or `TreeError` if the instance is too short
    ///   or holds a nominal value outside the domain
    pub fn branch(&self, instance: ArrayView1<f64>) -> Result<usize, ModelError> {
        let value = *instance
            .get(self.attribute())
            .ok_or(ModelError::TreeError("Feature dimension mismatch"))?;

        match *self {
            SplitTest::Nominal { arity, .. } => check_nominal_code(value, arity),
            SplitTest::Numeric { threshold, .. } => Ok(if value <= threshold { 0 } else { 1 }),
        }
    }
}

/// Outcome of evaluating a node's examples.
///
/// # Variants
///
/// - `Leaf` - The node is dominated by one class or no attribute carries information
/// - `Split` - Split on `test`, which achieves information gain `gain`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitDecision {
    Leaf,
    Split { test: SplitTest, gain: f64 },
}

/// Chooses how a node holding `rows` should be split.
///
/// The node becomes a leaf when the majority class holds more than
/// `proportion_threshold` of the examples. Otherwise every attribute is scored by
/// information gain (numeric attributes at their best threshold) and the first
/// attribute with the highest gain wins, unless that gain is zero.
///
/// # Parameters
///
/// - `rows` - Real and synthetic examples of the node
/// - `attributes` - Attribute metadata, indexed like the columns of `rows`
/// - `n_classes` - Number of classes
/// - `proportion_threshold` - Majority proportion above which the node is a leaf
///
/// # Returns
///
/// * `SplitDecision` - `Leaf`, or the winning test with its gain
pub fn select_split(
    rows: &LabeledRows,
    attributes: &[Attribute],
    n_classes: usize,
    proportion_threshold: f64,
) -> SplitDecision {
    let counts = rows.class_counts(n_classes);
    let purity = match max_index(&counts) {
        Some(majority) if !rows.is_empty() => counts[majority] / rows.len() as f64,
        _ => 1.0,
    };
    if purity > proportion_threshold {
        return SplitDecision::Leaf;
    }

    let mut best: Option<(SplitTest, f64)> = None;
    for (index, attribute) in attributes.iter().enumerate() {
        let candidate = match attribute.kind() {
            AttributeKind::Nominal { values } => {
                let gain = nominal_gain(rows, index, values.len(), &counts);
                Some((
                    SplitTest::Nominal {
                        attribute: index,
                        arity: values.len(),
                    },
                    gain,
                ))
            }
            AttributeKind::Numeric => {
                best_threshold(rows, index, &counts).map(|(threshold, gain)| {
                    (
                        SplitTest::Numeric {
                            attribute: index,
                            threshold,
                        },
                        gain,
                    )
                })
            }
            AttributeKind::String => None,
        };

        if let Some((test, gain)) = candidate {
            if best.as_ref().is_none_or(|&(_, best_gain)| gain > best_gain) {
                best = Some((test, gain));
            }
        }
    }

    match best {
        Some((test, gain)) if gain >= ZERO_GAIN => SplitDecision::Split { test, gain },
        _ => SplitDecision::Leaf,
    }
}

/// Information gain of a multiway split on a nominal attribute.
fn nominal_gain(rows: &LabeledRows, attribute: usize, arity: usize, counts: &[f64]) -> f64 {
    let mut partitions = vec![vec![0.0; counts.len()]; arity];
    for (row, label) in rows.iter() {
        let code = row[attribute];
        if code >= 0.0 && (code as usize) < arity {
            partitions[code as usize][label] += 1.0;
        }
    }
    information_gain(counts, &partitions)
}

/// Best binary split of a numeric attribute.
///
/// Candidate thresholds are the midpoints between consecutive sorted values that
/// differ and whose labels differ too. Equal values are ordered by label, so the
/// candidates do not depend on the order of the rows.
///
/// # Returns
///
/// * `Option<(f64, f64)>` - `(threshold, gain)` of the best candidate, `None` when there is no candidate
fn best_threshold(rows: &LabeledRows, attribute: usize, counts: &[f64]) -> Option<(f64, f64)> {
    let mut pairs: Vec<(f64, usize)> = rows
        .iter()
        .map(|(row, label)| (row[attribute], label))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut left = vec![0.0; counts.len()];
    let mut best: Option<(f64, f64)> = None;

    for k in 0..pairs.len().saturating_sub(1) {
        let (value, label) = pairs[k];
        let (next_value, next_label) = pairs[k + 1];
        left[label] += 1.0;

        if value == next_value || label == next_label {
            continue;
        }

        let threshold = (value + next_value) / 2.0;
        // adjacent floats can collapse the midpoint onto the upper value
        if threshold >= next_value {
            continue;
        }

        let right: Vec<f64> = counts.iter().zip(&left).map(|(c, l)| c - l).collect();
        let gain = information_gain(counts, &[left.clone(), right]);
        if best.is_none_or(|(_, best_gain)| gain > best_gain) {
            best = Some((threshold, gain));
        }
    }

    best
}
