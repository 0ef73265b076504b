pub use crate::machine_learning::estimator::{
    DensityEstimator, Estimator, NominalEstimator, NumericEstimator,
};
pub use crate::machine_learning::instances::{Attribute, AttributeKind, Instances, LabeledRows};
pub use crate::machine_learning::oracle::{Oracle, RuleOracle};
pub use crate::machine_learning::trepan::{
    NodeType, SplitTest, TreeCounts, TreeNode, Trepan, TrepanParams, TrepanTree,
};
