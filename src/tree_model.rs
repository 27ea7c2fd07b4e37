//! Regression tree: node model, split search and the recursive builder.
mod model;
mod node;
mod regression_tree;
mod split;
mod unit_test;

pub use model::RegressionTreeModel;
pub use node::{Comparator, LeafNode, Node, SplitInfo, SplitKind, SplitNode};
pub use regression_tree::RegressionTree;
pub use split::NoViableSplit;
