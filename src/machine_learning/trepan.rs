use crate::machine_learning::helper_function::{preliminary_check, validate_proportion_threshold};
use crate::machine_learning::instances::{Instances, LabeledRows};
use crate::machine_learning::oracle::Oracle;
use crate::{Deserialize, ModelError, Serialize};
use ahash::AHashSet;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use std::collections::VecDeque;

mod split;
mod synthesizer;
mod tree;

pub use split::*;
pub use synthesizer::*;
pub use tree::*;

/// Smallest number of children a split can create
const MIN_ARITY: usize = 2;

/// Hyperparameters of the tree extraction.
///
/// # Fields
///
/// - `max_nodes` - Upper bound on the number of nodes of the final tree, 0 for no bound
/// - `min_samples` - Number of examples every expanded node is topped up to with synthetic rows
/// - `proportion_threshold` - A node whose majority class holds more than this share of its examples becomes a leaf. Must lie in (0, 1].
/// - `best_first` - Grow the full tree, then keep the nodes with the highest `reach * (1 - fidelity)` within `max_nodes`
/// - `pruning` - Collapse internal nodes whose children are leaves of one class
/// - `random_state` - Seed of every node's sample generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrepanParams {
    pub max_nodes: usize,
    pub min_samples: usize,
    pub proportion_threshold: f64,
    pub best_first: bool,
    pub pruning: bool,
    pub random_state: u64,
}

/// Defaults: unbounded tree, 100 examples per node, leaves above 95% purity,
/// breadth-first growth, no pruning and seed 0.
impl Default for TrepanParams {
    fn default() -> Self {
        Self {
            max_nodes: 0,
            min_samples: 100,
            proportion_threshold: 0.95,
            best_first: false,
            pruning: false,
            random_state: 0,
        }
    }
}

/// TREPAN extracts a decision tree mimicking an opaque classifier (the oracle).
///
/// Training labels are replaced by the oracle's answers, then nodes are expanded
/// in first-in-first-out order. Before a node is evaluated it is topped up to
/// `min_samples` examples drawn from per-attribute estimators of its real
/// examples and labelled by the oracle, so deep nodes with few real examples
/// still get an informed split. Growth stops on pure nodes, uninformative
/// attributes, exhausted branches or the node budget.
///
/// # Fields
///
/// - `oracle` - The classifier being explained
/// - `params` - Extraction hyperparameters
/// - `tree` - The extracted tree, `None` before `fit`
/// - `fidelity` - Agreement of the tree with the oracle on the root's real and synthetic examples
/// - `oracle_labeled_data` - The training data relabelled by the oracle
///
/// # Example
/// ```rust
/// use trepan::machine_learning::*;
/// use ndarray::{array, Array1};
///
/// let data = Instances::new(
///     vec![Attribute::numeric("x")],
///     Attribute::nominal("class", vec!["low", "high"]),
///     array![[1.0], [2.0], [3.0], [4.0], [6.0], [7.0], [8.0], [9.0]],
///     Array1::zeros(8),
/// )
/// .unwrap();
///
/// let oracle = RuleOracle::new(2, |row| (row[0] > 5.0) as usize);
/// let params = TrepanParams { min_samples: 0, ..TrepanParams::default() };
/// let mut model = Trepan::new(oracle, Some(params)).unwrap();
/// model.fit(&data).unwrap();
///
/// let root = model.get_tree().unwrap().root().unwrap();
/// assert_eq!(root.split().and_then(|s| s.threshold()), Some(5.0));
/// assert_eq!(model.predict_one(&[8.5]).unwrap(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Trepan<O> {
    oracle: O,
    params: TrepanParams,
    tree: Option<TrepanTree>,
    fidelity: Option<f64>,
    oracle_labeled_data: Option<Instances>,
}

impl<O: Oracle> Trepan<O> {
    /// Creates an unfitted extractor around `oracle`.
    ///
    /// # Parameters
    ///
    /// - `oracle` - The classifier to explain
    /// - `params` - Optional hyperparameters. If `None`, default parameters are used.
    ///
    /// # Returns
    ///
    /// * `Result<Self, ModelError>` - The extractor, or `InputValidationError` for an invalid `proportion_threshold`
    pub fn new(oracle: O, params: Option<TrepanParams>) -> Result<Self, ModelError> {
        let params = params.unwrap_or_default();
        validate_proportion_threshold(params.proportion_threshold)?;

        Ok(Self {
            oracle,
            params,
            tree: None,
            fidelity: None,
            oracle_labeled_data: None,
        })
    }

    // Getters
    get_field_as_ref!(get_params, params, &TrepanParams);
    get_field_as_ref!(get_oracle, oracle, &O);
    get_field!(get_fidelity, fidelity, Option<f64>);

    /// Gets the extracted tree.
    ///
    /// # Returns
    ///
    /// * `Option<&TrepanTree>` - The tree, `None` before `fit`
    pub fn get_tree(&self) -> Option<&TrepanTree> {
        self.tree.as_ref()
    }

    /// Gets the training data with its labels replaced by the oracle's predictions.
    ///
    /// # Returns
    ///
    /// * `Option<&Instances>` - The relabelled data, `None` before `fit`
    pub fn get_oracle_labeled_data(&self) -> Option<&Instances> {
        self.oracle_labeled_data.as_ref()
    }

    /// Extracts a tree from the oracle using `data` as the root's real examples.
    ///
    /// The labels of `data` are ignored; every instance is relabelled by the oracle.
    ///
    /// # Parameters
    ///
    /// * `data` - Training instances with nominal and numeric attributes and a nominal class
    ///
    /// # Returns
    ///
    /// * `Result<&mut Self, ModelError>` - A mutable reference to `self` for method chaining,
    ///   `InputValidationError` for unusable data, or `OracleError` if the oracle fails
    pub fn fit(&mut self, data: &Instances) -> Result<&mut Self, ModelError> {
        preliminary_check(data)?;

        let labeled = self.classify_with_oracle(data)?;
        let tree = self.make_tree(&labeled)?;

        let root = tree
            .root()
            .ok_or(ModelError::TreeError("Tree is empty"))?;
        let fidelity = tree.agreement(&root.combined_rows()?)?;
        let counts = tree.count_nodes();

        self.tree = Some(tree);
        self.fidelity = Some(fidelity);
        self.oracle_labeled_data = Some(labeled);

        println!(
            "\nTrepan extraction completed: {} instances, {} nodes, {} leaves, fidelity: {:.4}",
            data.num_instances(),
            counts.nodes,
            counts.leaves,
            fidelity
        );

        Ok(self)
    }

    /// Replaces every label of `data` with the oracle's prediction.
    fn classify_with_oracle(&self, data: &Instances) -> Result<Instances, ModelError> {
        let n_classes = data.num_classes();
        let labels = data
            .x()
            .outer_iter()
            .map(|row| query_oracle(&self.oracle, row, n_classes))
            .collect::<Result<Vec<usize>, ModelError>>()?;
        data.with_labels(Array1::from_vec(labels))
    }

    /// Builds the root, grows the tree and applies the optional best-first
    /// selection and pruning.
    fn make_tree(&self, data: &Instances) -> Result<TrepanTree, ModelError> {
        let mut tree = TrepanTree::new(data.attributes().to_vec(), data.class_attribute().clone());
        tree.push(TreeNode::new(
            LabeledRows::from_instances(data),
            None,
            NodeType::Root,
            1.0,
        ));
        self.prepare_node(&mut tree, ROOT)?;

        self.expand(&mut tree)?;

        if self.params.best_first && self.params.max_nodes > 0 {
            select_best_first(&mut tree, self.params.max_nodes);
        }
        if self.params.pruning {
            prune(&mut tree);
        }

        Ok(tree)
    }

    /// Draws the node's synthetic examples and derives its statistics.
    fn prepare_node(&self, tree: &mut TrepanTree, index: usize) -> Result<(), ModelError> {
        let n_classes = tree.n_classes();
        let synthetic = draw_sample(
            &tree.nodes[index].real,
            tree.attributes(),
            n_classes,
            self.params.min_samples,
            &self.oracle,
            self.params.random_state,
        )?;

        let node = &mut tree.nodes[index];
        node.synthetic = synthetic;
        node.compute_statistics(n_classes);
        Ok(())
    }

    /// Expands queued nodes in first-in-first-out order.
    ///
    /// In best-first mode the growth is unbounded and the budget is applied
    /// afterwards. Otherwise a split is only materialized while the tree stays
    /// within `max_nodes`, and nodes still queued once no split fits become leaves.
    fn expand(&self, tree: &mut TrepanTree) -> Result<(), ModelError> {
        let max_nodes = self.params.max_nodes;
        let capped = !self.params.best_first && max_nodes > 0;

        let mut queue = VecDeque::from([ROOT]);
        let mut next_id = 0;

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(
            ProgressStyle::default_spinner()
                .template("[{elapsed_precise}] {spinner} {msg}")
                .map_err(|e| ModelError::ProcessingError(e.to_string()))?,
        );

        while let Some(&index) = queue.front() {
            if capped && tree.len() + MIN_ARITY > max_nodes {
                break;
            }
            queue.pop_front();
            tree.nodes[index].id = Some(next_id);
            next_id += 1;

            let node = &tree.nodes[index];
            let decision = select_split(
                &node.combined_rows()?,
                tree.attributes(),
                tree.n_classes(),
                self.params.proportion_threshold,
            );

            match decision {
                SplitDecision::Split { test, .. }
                    if !capped || tree.len() + test.arity() <= max_nodes =>
                {
                    for child in tree.split_node(index, test)? {
                        if tree.nodes[child].is_leaf() {
                            tree.nodes[child].id = Some(next_id);
                            next_id += 1;
                        } else {
                            self.prepare_node(tree, child)?;
                            queue.push_back(child);
                        }
                    }
                }
                _ => tree.nodes[index].make_leaf(),
            }

            progress_bar.set_message(format!(
                "Expanded: {} | Nodes: {} | Queued: {}",
                next_id,
                tree.len(),
                queue.len()
            ));
            progress_bar.tick();
        }

        for index in queue.drain(..) {
            tree.nodes[index].id = Some(next_id);
            next_id += 1;
            tree.nodes[index].make_leaf();
        }

        progress_bar.finish_with_message(format!("Nodes: {} | Done", tree.len()));
        Ok(())
    }

    fn tree(&self) -> Result<&TrepanTree, ModelError> {
        self.tree.as_ref().ok_or(ModelError::NotFitted)
    }

    /// Predicts the class of a single instance.
    ///
    /// # Parameters
    ///
    /// * `x` - Attribute values of the instance, nominal values given by their code
    ///
    /// # Returns
    ///
    /// * `Result<usize, ModelError>` - The class index of the leaf the instance falls into,
    ///   `NotFitted` before `fit`, or `TreeError` for an instance the tree cannot route
    pub fn predict_one(&self, x: &[f64]) -> Result<usize, ModelError> {
        self.tree()?.classify(ArrayView1::from(x))
    }

    /// Predicts the class of every row of `x` in parallel.
    ///
    /// # Returns
    ///
    /// * `Result<Array1<usize>, ModelError>` - One class index per row
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<usize>, ModelError> {
        let tree = self.tree()?;
        if x.ncols() != tree.attributes().len() {
            return Err(ModelError::TreeError("Feature dimension mismatch"));
        }

        let predictions: Result<Vec<usize>, ModelError> = x
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| tree.classify(row))
            .collect();

        Ok(Array1::from_vec(predictions?))
    }

    /// Class distribution of the leaf a single instance falls into.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<f64>, ModelError>` - One probability per class, summing to 1
    pub fn predict_proba_one(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.tree()?.distribution_for(ArrayView1::from(x))
    }

    /// Class distributions for every row of `x`, computed in parallel.
    ///
    /// # Returns
    ///
    /// * `Result<Array2<f64>, ModelError>` - Shape `(n_samples, n_classes)`, each row summing to 1
    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        let tree = self.tree()?;
        if x.ncols() != tree.attributes().len() {
            return Err(ModelError::TreeError("Feature dimension mismatch"));
        }

        let probabilities: Result<Vec<Vec<f64>>, ModelError> = x
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| tree.distribution_for(row))
            .collect();

        let n_classes = tree.n_classes();
        let flat: Vec<f64> = probabilities?.into_iter().flatten().collect();
        Array2::from_shape_vec((x.nrows(), n_classes), flat)
            .map_err(|e| ModelError::ProcessingError(e.to_string()))
    }

    /// Share of `data` on which the tree and the oracle predict the same class.
    ///
    /// # Returns
    ///
    /// * `Result<f64, ModelError>` - Agreement in [0, 1], `NotFitted` before `fit`,
    ///   or `InputValidationError` for empty data or a different attribute count
    pub fn compute_fidelity(&self, data: &Instances) -> Result<f64, ModelError> {
        let tree = self.tree()?;
        if data.num_instances() == 0 {
            return Err(ModelError::InputValidationError(
                "No instances to compare".to_string(),
            ));
        }
        if data.num_attributes() != tree.attributes().len() {
            return Err(ModelError::InputValidationError(format!(
                "Data has {} attributes but the tree was built on {}",
                data.num_attributes(),
                tree.attributes().len()
            )));
        }

        let mut agree = 0usize;
        for row in data.x().outer_iter() {
            if tree.classify(row)? == self.oracle.classify(row)? {
                agree += 1;
            }
        }
        Ok(agree as f64 / data.num_instances() as f64)
    }

    /// Counts the nodes, internal nodes and leaves of the tree.
    pub fn count_nodes(&self) -> Result<TreeCounts, ModelError> {
        self.tree().map(TrepanTree::count_nodes)
    }

    /// Renders the tree as indented text.
    ///
    /// Every branch line reads `attribute = value` (or `<=`/`>` a threshold)
    /// followed by the child's reach, fidelity and best-first priority, and
    /// leaves end with `: class`. Leaf and node counts close the report.
    ///
    /// # Returns
    ///
    /// * `Result<String, ModelError>` - The report, or `NotFitted` before `fit`
    pub fn generate_tree_structure(&self) -> Result<String, ModelError> {
        Ok(self.tree()?.to_string())
    }
}

/// Keeps the root and the internal nodes with the highest `best_first`
/// priority whose children still fit in `max_nodes`; every other internal node
/// becomes a leaf.
///
/// Candidates are taken from a pool seeded with the root. Ties go to the node
/// that left the expansion queue first.
pub(crate) fn select_best_first(tree: &mut TrepanTree, max_nodes: usize) {
    let mut expanded = AHashSet::new();
    let mut pool: Vec<usize> = Vec::new();
    if !tree.nodes[ROOT].is_leaf() {
        pool.push(ROOT);
    }
    let mut size = 1;

    while let Some(position) = best_candidate(tree, &pool) {
        let index = pool.swap_remove(position);
        let children = &tree.nodes[index].children;
        if size + children.len() > max_nodes {
            continue;
        }

        size += children.len();
        expanded.insert(index);
        pool.extend(
            children
                .iter()
                .copied()
                .filter(|&child| !tree.nodes[child].is_leaf()),
        );
    }

    let mut stack = vec![ROOT];
    while let Some(index) = stack.pop() {
        if tree.nodes[index].is_leaf() {
            continue;
        }
        if expanded.contains(&index) {
            stack.extend(tree.nodes[index].children.iter().copied());
        } else {
            tree.nodes[index].make_leaf();
        }
    }

    tree.compact();
}

/// Position in `pool` of the node with the highest priority.
fn best_candidate(tree: &TrepanTree, pool: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (position, &index) in pool.iter().enumerate() {
        let node = &tree.nodes[index];
        best = match best {
            Some(b) => {
                let current = &tree.nodes[pool[b]];
                if node.best_first > current.best_first
                    || (node.best_first == current.best_first && node.id < current.id)
                {
                    Some(position)
                } else {
                    Some(b)
                }
            }
            None => Some(position),
        };
    }
    best
}

/// Class distribution of the children of `index`, weighted by their example counts.
///
/// Falls back to a one-hot distribution on `label` when no child holds an example.
fn merged_distribution(tree: &TrepanTree, index: usize, label: usize) -> Vec<f64> {
    let mut merged = vec![0.0; tree.n_classes()];
    let mut total = 0.0;
    for &child in &tree.nodes[index].children {
        let child = &tree.nodes[child];
        let weight = child.total_examples() as f64;
        for (slot, p) in merged.iter_mut().zip(&child.class_distribution) {
            *slot += weight * p;
        }
        total += weight;
    }

    if total > 0.0 {
        merged.iter_mut().for_each(|p| *p /= total);
    } else if let Some(p) = merged.get_mut(label) {
        *p = 1.0;
    }
    merged
}

/// Collapses internal nodes whose children are all leaves predicting one class,
/// repeating until no node can be collapsed. A collapsed node takes the merged
/// distribution of its children, so its label and distribution stay consistent.
///
/// # Returns
///
/// * `usize` - Number of collapsed nodes
pub(crate) fn prune(tree: &mut TrepanTree) -> usize {
    let mut collapsed = 0;

    loop {
        let mut order = vec![ROOT];
        let mut head = 0;
        while head < order.len() {
            order.extend(tree.nodes[order[head]].children.iter().copied());
            head += 1;
        }

        let mut changed = false;
        for &index in order.iter().rev() {
            let node = &tree.nodes[index];
            let Some(&first) = node.children.first() else {
                continue;
            };
            let label = tree.nodes[first].class_label;
            let uniform = node.children.iter().all(|&child| {
                tree.nodes[child].is_leaf() && tree.nodes[child].class_label == label
            });

            if uniform {
                let distribution = merged_distribution(tree, index, label);
                tree.nodes[index].collapse(label, distribution);
                collapsed += 1;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    tree.compact();
    collapsed
}
