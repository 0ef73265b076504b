use super::split::SplitTest;
use crate::machine_learning::instances::{Attribute, LabeledRows};
use crate::math::{max_index, round_to};
use crate::{Deserialize, ModelError, Serialize};
use ndarray::{ArrayView1, Axis, concatenate};
use std::fmt;

/// Arena index of the root node
pub const ROOT: usize = 0;

/// Role of a node in the tree.
///
/// # Variants
///
/// - `Root` - The node holding every training instance
/// - `Internal` - A node created by a split that may be split further
/// - `Leaf` - A terminal node carrying a class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Root,
    Internal,
    Leaf,
}

/// Node counts of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeCounts {
    pub nodes: usize,
    pub internal: usize,
    pub leaves: usize,
}

/// One node of an extracted tree.
///
/// # Fields
///
/// - `real` - Training examples reaching the node, labelled by the oracle
/// - `synthetic` - Oracle-labelled examples drawn to top the node up
/// - `class_distribution` - Normalized class counts over real and synthetic examples
/// - `class_label` - Majority class, the first one on ties
/// - `split` - Test routing instances to the children, `None` for leaves
/// - `children` - Arena indices of the children, one per branch of `split`
/// - `parent` - Arena index of the parent, `None` for the root
/// - `reach` - Estimated fraction of the input distribution reaching the node
/// - `fidelity` - Share of the node's examples carrying `class_label`
/// - `best_first` - Expansion priority, `reach * (1 - fidelity)`
/// - `id` - Order in which the node left the expansion queue
/// - `node_type` - Role of the node
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) real: LabeledRows,
    pub(crate) synthetic: LabeledRows,
    pub(crate) class_distribution: Vec<f64>,
    pub(crate) class_label: usize,
    pub(crate) split: Option<SplitTest>,
    pub(crate) children: Vec<usize>,
    pub(crate) parent: Option<usize>,
    pub(crate) reach: f64,
    pub(crate) fidelity: f64,
    pub(crate) best_first: f64,
    pub(crate) id: Option<usize>,
    pub(crate) node_type: NodeType,
}

impl TreeNode {
    pub(crate) fn new(
        real: LabeledRows,
        parent: Option<usize>,
        node_type: NodeType,
        reach: f64,
    ) -> Self {
        let n_features = real.x.ncols();
        Self {
            real,
            synthetic: LabeledRows::empty(n_features),
            class_distribution: Vec::new(),
            class_label: 0,
            split: None,
            children: Vec::new(),
            parent,
            reach,
            fidelity: 0.0,
            best_first: 0.0,
            id: None,
            node_type,
        }
    }

    /// A leaf for a branch no real example reaches; it inherits the parent's class.
    pub(crate) fn degenerate(
        n_features: usize,
        n_classes: usize,
        parent: usize,
        class_label: usize,
    ) -> Self {
        let mut class_distribution = vec![0.0; n_classes];
        if let Some(p) = class_distribution.get_mut(class_label) {
            *p = 1.0;
        }
        Self {
            class_distribution,
            class_label,
            ..Self::new(
                LabeledRows::empty(n_features),
                Some(parent),
                NodeType::Leaf,
                0.0,
            )
        }
    }

    get_field_as_ref!(real, real, &LabeledRows);
    get_field_as_ref!(synthetic, synthetic, &LabeledRows);
    get_field_as_ref!(class_distribution, class_distribution, &Vec<f64>);
    get_field!(class_label, class_label, usize);
    get_field!(split, split, Option<SplitTest>);
    get_field_as_ref!(children, children, &Vec<usize>);
    get_field!(parent, parent, Option<usize>);
    get_field!(reach, reach, f64);
    get_field!(fidelity, fidelity, f64);
    get_field!(best_first, best_first, f64);
    get_field!(id, id, Option<usize>);
    get_field!(node_type, node_type, NodeType);

    pub fn is_leaf(&self) -> bool {
        self.node_type == NodeType::Leaf
    }

    pub fn total_examples(&self) -> usize {
        self.real.len() + self.synthetic.len()
    }

    /// Derives the distribution, label, fidelity and priority from the examples.
    pub(crate) fn compute_statistics(&mut self, n_classes: usize) {
        let mut distribution = self.real.class_counts(n_classes);
        for (slot, count) in distribution
            .iter_mut()
            .zip(self.synthetic.class_counts(n_classes))
        {
            *slot += count;
        }

        let total = self.total_examples() as f64;
        if total > 0.0 {
            distribution.iter_mut().for_each(|p| *p /= total);
        }

        self.class_label = max_index(&distribution).unwrap_or(0);
        self.fidelity = distribution.get(self.class_label).copied().unwrap_or(0.0);
        self.best_first = self.reach * (1.0 - self.fidelity);
        self.class_distribution = distribution;
    }

    /// Real and synthetic examples stacked together.
    pub(crate) fn combined_rows(&self) -> Result<LabeledRows, ModelError> {
        if self.synthetic.is_empty() {
            return Ok(self.real.clone());
        }

        let x = concatenate(Axis(0), &[self.real.x.view(), self.synthetic.x.view()])
            .map_err(|e| ModelError::ProcessingError(e.to_string()))?;
        let y = self
            .real
            .y
            .iter()
            .chain(&self.synthetic.y)
            .copied()
            .collect();
        Ok(LabeledRows::new(x, y))
    }

    /// Turns the node into a leaf predicting `class_label` with `distribution`.
    pub(crate) fn collapse(&mut self, class_label: usize, distribution: Vec<f64>) {
        self.class_label = class_label;
        self.fidelity = distribution.get(class_label).copied().unwrap_or(0.0);
        self.best_first = self.reach * (1.0 - self.fidelity);
        self.class_distribution = distribution;
        self.make_leaf();
    }

    pub(crate) fn make_leaf(&mut self) {
        self.split = None;
        self.children.clear();
        self.node_type = NodeType::Leaf;
    }
}

/// Arena of nodes forming an extracted decision tree.
///
/// Nodes refer to their parent and children by index; the root is always at
/// index `ROOT`. Attribute metadata is kept so the tree can classify and print
/// itself without the training data.
#[derive(Debug, Clone)]
pub struct TrepanTree {
    pub(crate) nodes: Vec<TreeNode>,
    attributes: Vec<Attribute>,
    class_attribute: Attribute,
}

impl TrepanTree {
    pub(crate) fn new(attributes: Vec<Attribute>, class_attribute: Attribute) -> Self {
        Self {
            nodes: Vec::new(),
            attributes,
            class_attribute,
        }
    }

    pub(crate) fn push(&mut self, node: TreeNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn class_attribute(&self) -> &Attribute {
        &self.class_attribute
    }

    pub fn n_classes(&self) -> usize {
        self.class_attribute.num_values()
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.get(ROOT)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Splits the node at `index` with `test` and returns the indices of the new children.
    ///
    /// Real and synthetic examples are partitioned by branch, but a child starts
    /// from its real partition only. A child without real examples becomes a
    /// degenerate leaf. When at most one child would receive real examples the
    /// split is abandoned, the node becomes a leaf and no child is returned.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<usize>, ModelError>` - Arena indices of the children in branch order
    pub(crate) fn split_node(
        &mut self,
        index: usize,
        test: SplitTest,
    ) -> Result<Vec<usize>, ModelError> {
        let n_classes = self.n_classes();
        let parent = &self.nodes[index];
        let arity = test.arity();

        let mut partitions = vec![Vec::new(); arity];
        for (i, (row, _)) in parent.real.iter().enumerate() {
            partitions[test.branch(row)?].push(i);
        }
        let mut synthetic_counts = vec![0usize; arity];
        for (row, _) in parent.synthetic.iter() {
            synthetic_counts[test.branch(row)?] += 1;
        }

        if partitions.iter().filter(|p| !p.is_empty()).count() <= 1 {
            self.nodes[index].make_leaf();
            return Ok(Vec::new());
        }

        let n_features = parent.real.x.ncols();
        let total = parent.total_examples() as f64;
        let new_nodes: Vec<TreeNode> = partitions
            .iter()
            .zip(&synthetic_counts)
            .map(|(partition, &synthetic)| {
                if partition.is_empty() {
                    TreeNode::degenerate(n_features, n_classes, index, parent.class_label)
                } else {
                    let reach = parent.reach * (partition.len() + synthetic) as f64 / total;
                    TreeNode::new(
                        parent.real.select(partition),
                        Some(index),
                        NodeType::Internal,
                        reach,
                    )
                }
            })
            .collect();

        let children: Vec<usize> = new_nodes.into_iter().map(|n| self.push(n)).collect();
        let parent = &mut self.nodes[index];
        parent.split = Some(test);
        parent.children = children.clone();
        Ok(children)
    }

    /// Drops nodes unreachable from the root and renumbers the rest breadth-first.
    pub(crate) fn compact(&mut self) {
        if self.nodes.is_empty() {
            return;
        }

        let mut order = vec![ROOT];
        let mut head = 0;
        while head < order.len() {
            order.extend(self.nodes[order[head]].children.iter().copied());
            head += 1;
        }

        let mut remap = vec![None; self.nodes.len()];
        for (new_index, &old_index) in order.iter().enumerate() {
            remap[old_index] = Some(new_index);
        }

        let mut old: Vec<Option<TreeNode>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        for &old_index in &order {
            if let Some(mut node) = old[old_index].take() {
                node.parent = node.parent.and_then(|p| remap[p]);
                node.children = node.children.iter().filter_map(|&c| remap[c]).collect();
                self.nodes.push(node);
            }
        }
    }

    /// Counts the nodes reachable from the root.
    pub fn count_nodes(&self) -> TreeCounts {
        let mut counts = TreeCounts {
            nodes: 0,
            internal: 0,
            leaves: 0,
        };
        if self.nodes.is_empty() {
            return counts;
        }

        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            counts.nodes += 1;
            if node.split.is_some() {
                counts.internal += 1;
                stack.extend(node.children.iter().copied());
            } else {
                counts.leaves += 1;
            }
        }
        counts
    }

    /// Descends from the root to the leaf `instance` falls into.
    ///
    /// # Returns
    ///
    /// * `Result<&TreeNode, ModelError>` - The leaf, or `TreeError` if the instance has the wrong
    ///   number of attributes or holds a nominal value with no branch
    pub fn leaf_for(&self, instance: ArrayView1<f64>) -> Result<&TreeNode, ModelError> {
        if instance.len() != self.attributes.len() {
            return Err(ModelError::TreeError("Feature dimension mismatch"));
        }

        let mut node = self.root().ok_or(ModelError::TreeError("Tree is empty"))?;
        while let Some(test) = node.split {
            let branch = test.branch(instance)?;
            let child = *node
                .children
                .get(branch)
                .ok_or(ModelError::TreeError("Branch has no child node"))?;
            node = &self.nodes[child];
        }
        Ok(node)
    }

    pub fn classify(&self, instance: ArrayView1<f64>) -> Result<usize, ModelError> {
        self.leaf_for(instance).map(|leaf| leaf.class_label)
    }

    pub fn distribution_for(&self, instance: ArrayView1<f64>) -> Result<Vec<f64>, ModelError> {
        self.leaf_for(instance)
            .map(|leaf| leaf.class_distribution.clone())
    }

    /// Share of `rows` whose label the tree reproduces.
    pub(crate) fn agreement(&self, rows: &LabeledRows) -> Result<f64, ModelError> {
        if rows.is_empty() {
            return Ok(0.0);
        }

        let mut agree = 0usize;
        for (row, label) in rows.iter() {
            if self.classify(row)? == label {
                agree += 1;
            }
        }
        Ok(agree as f64 / rows.len() as f64)
    }

    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, index: usize, level: usize) -> fmt::Result {
        let node = &self.nodes[index];
        let Some(test) = node.split else {
            return write!(
                f,
                ": {}",
                self.class_attribute.value_name(node.class_label)
            );
        };

        let attribute = &self.attributes[test.attribute()];
        for (branch, &child_index) in node.children.iter().enumerate() {
            let child = &self.nodes[child_index];
            write!(f, "\n{}", "| ".repeat(level))?;
            match test {
                SplitTest::Nominal { .. } => {
                    write!(f, "{} = {}", attribute.name(), attribute.value_name(branch))?
                }
                SplitTest::Numeric { threshold, .. } => {
                    let op = if branch == 0 { "<=" } else { ">" };
                    write!(f, "{} {} {}", attribute.name(), op, round_to(threshold, 6))?
                }
            }
            write!(
                f,
                " (R= {}, F= {}, B= {})",
                round_to(child.reach, 3),
                round_to(child.fidelity, 3),
                round_to(child.best_first, 3)
            )?;
            self.write_subtree(f, child_index, level + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TrepanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return write!(f, "Trepan: No model built yet.");
        }

        let counts = self.count_nodes();
        write!(f, "Trepan\n\n")?;
        self.write_subtree(f, ROOT, 0)?;
        write!(
            f,
            "\n\nNumber of Leaves: \t{}\n\nSize of the tree: \t{}\n",
            counts.leaves, counts.nodes
        )
    }
}
