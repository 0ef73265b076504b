use crate::ModelError;
use crate::{Deserialize, Serialize};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Kind of an attribute, which decides how it is split and estimated.
///
/// # Variants
///
/// - `Nominal` - Finite domain; values are stored as the code `0..values.len()`
/// - `Numeric` - Real-valued attribute, split with a threshold
/// - `String` - Free text; never accepted by the tree builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    Nominal { values: Vec<String> },
    Numeric,
    String,
}

/// Immutable metadata of one column of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    kind: AttributeKind,
}

impl Attribute {
    /// Creates a nominal attribute whose domain is the given list of labels.
    pub fn nominal<S: Into<String>>(name: &str, values: Vec<S>) -> Self {
        Self {
            name: name.to_string(),
            kind: AttributeKind::Nominal {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Creates a numeric attribute.
    pub fn numeric(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Creates a string attribute.
    pub fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AttributeKind::String,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self.kind, AttributeKind::Nominal { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, AttributeKind::Numeric)
    }

    /// Size of the domain of a nominal attribute, 0 for any other kind.
    pub fn num_values(&self) -> usize {
        match &self.kind {
            AttributeKind::Nominal { values } => values.len(),
            _ => 0,
        }
    }

    /// Label of the nominal code `index`, falling back to the code itself.
    pub fn value_name(&self, index: usize) -> String {
        match &self.kind {
            AttributeKind::Nominal { values } => values
                .get(index)
                .cloned()
                .unwrap_or_else(|| index.to_string()),
            _ => index.to_string(),
        }
    }
}

/// An ordered set of examples with their attribute metadata and class labels.
///
/// Rows of `x` are examples and columns follow `attributes`. Nominal values are
/// stored as their code, and `y` holds the code of the class attribute.
///
/// # Example
/// ```rust
/// use trepan::machine_learning::{Attribute, Instances};
/// use ndarray::array;
///
/// let data = Instances::new(
///     vec![Attribute::numeric("x")],
///     Attribute::nominal("class", vec!["low", "high"]),
///     array![[1.0], [9.0]],
///     array![0, 1],
/// )
/// .unwrap();
/// assert_eq!(data.num_instances(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Instances {
    attributes: Vec<Attribute>,
    class_attribute: Attribute,
    x: Array2<f64>,
    y: Array1<usize>,
}

impl Instances {
    /// Creates a dataset, checking that the shapes of `x`, `y` and `attributes` agree.
    ///
    /// # Returns
    ///
    /// * `Result<Instances, ModelError>` - The dataset, or `InputValidationError` on a shape mismatch
    pub fn new(
        attributes: Vec<Attribute>,
        class_attribute: Attribute,
        x: Array2<f64>,
        y: Array1<usize>,
    ) -> Result<Self, ModelError> {
        if x.ncols() != attributes.len() {
            return Err(ModelError::InputValidationError(format!(
                "Data has {} columns but {} attributes were declared",
                x.ncols(),
                attributes.len()
            )));
        }

        if x.nrows() != y.len() {
            return Err(ModelError::InputValidationError(format!(
                "Input data and target vector have different lengths, x rows: {}, y length: {}",
                x.nrows(),
                y.len()
            )));
        }

        Ok(Self {
            attributes,
            class_attribute,
            x,
            y,
        })
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn class_attribute(&self) -> &Attribute {
        &self.class_attribute
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, usize> {
        self.y.view()
    }

    pub fn num_instances(&self) -> usize {
        self.x.nrows()
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn num_classes(&self) -> usize {
        self.class_attribute.num_values()
    }

    /// Returns a copy of the dataset with the labels replaced.
    pub(crate) fn with_labels(&self, y: Array1<usize>) -> Result<Self, ModelError> {
        Self::new(
            self.attributes.clone(),
            self.class_attribute.clone(),
            self.x.clone(),
            y,
        )
    }
}

/// Feature rows and class labels owned by a tree node.
///
/// Nodes hold copies of the rows that reach them, never views into the caller's data.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRows {
    pub(crate) x: Array2<f64>,
    pub(crate) y: Vec<usize>,
}

impl LabeledRows {
    pub(crate) fn new(x: Array2<f64>, y: Vec<usize>) -> Self {
        Self { x, y }
    }

    /// An empty set of rows with `n_features` columns.
    pub(crate) fn empty(n_features: usize) -> Self {
        Self {
            x: Array2::zeros((0, n_features)),
            y: Vec::new(),
        }
    }

    pub(crate) fn from_instances(data: &Instances) -> Self {
        Self {
            x: data.x.clone(),
            y: data.y.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> &[usize] {
        &self.y
    }

    /// Copies the rows at `indices`, in order.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select(Axis(0), indices),
            y: indices.iter().map(|&i| self.y[i]).collect(),
        }
    }

    /// Per-class counts of the labels, `n_classes` long.
    pub(crate) fn class_counts(&self, n_classes: usize) -> Vec<f64> {
        let mut counts = vec![0.0; n_classes];
        for &label in &self.y {
            counts[label] += 1.0;
        }
        counts
    }

    /// Iterates over `(row, label)` pairs.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (ArrayView1<'_, f64>, usize)> {
        self.x.outer_iter().zip(self.y.iter().copied())
    }
}
