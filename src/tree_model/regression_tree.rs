use core::fmt;

use serde::{Deserialize, Serialize};

use super::{
    node::{LeafNode, Node, SplitNode},
    split::best_split,
};
use crate::{AttributeKind, PredictError, PredictionWalk, TrainingSet, TreeSettings, Value};

/// Regression tree learnt from a [`TrainingSet`].
///
/// A split node owns one subtree per branch, in branch order; a leaf has no
/// children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub(crate) root: Node,
    pub(crate) children: Vec<RegressionTree>,
}

impl RegressionTree {
    /// Learns a tree with the default [`TreeSettings`].
    pub fn learn(training_set: &mut TrainingSet) -> Self {
        Self::learn_with(training_set, &TreeSettings::default())
    }

    /// Learns a tree over the whole training set.
    ///
    /// A range becomes a leaf when it holds at most `leaf_percent` percent of
    /// the examples, when no attribute can split it or when the best split has
    /// a single branch. The examples are left reordered.
    ///
    /// # Panics
    /// If the training set is empty.
    pub fn learn_with(training_set: &mut TrainingSet, settings: &TreeSettings) -> Self {
        let leaf_threshold = leaf_threshold(training_set.len(), settings.leaf_percent);
        let end = training_set.len() - 1;
        let mut builder = TreeBuilder {
            training_set,
            leaf_threshold,
            next_id: 0,
        };
        builder.build(0, end)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn children(&self) -> &[RegressionTree] {
        &self.children
    }

    /// Subtree reached through branch `child` of the root.
    pub fn child(&self, child: usize) -> Option<&RegressionTree> {
        self.children.get(child)
    }

    /// Starts an interactive prediction at the root.
    pub fn walk(&self) -> PredictionWalk<'_> {
        PredictionWalk::new(self)
    }

    /// Predicts the class value of one row of explanatory values, given in
    /// the attribute order of the training set.
    pub fn predict(&self, values: &[Value]) -> Result<f64, PredictError> {
        let mut tree = self;
        loop {
            let split = match &tree.root {
                Node::Leaf(leaf) => return Ok(leaf.predicted_value),
                Node::Split(split) => split,
            };
            let index = split.attribute.index();
            let value = values.get(index).ok_or(PredictError::Arity {
                expected: index + 1,
                got: values.len(),
            })?;
            tree = match (split.attribute.kind(), value) {
                (AttributeKind::Continuous, Value::Text(_)) => None,
                _ => split
                    .test_condition(value)
                    .and_then(|child| tree.children.get(child)),
            }
            .ok_or_else(|| PredictError::UnknownValue {
                attribute: split.attribute.name().to_owned(),
                value: value.to_string(),
            })?;
        }
    }

    /// One `condition AND condition ==> Class=value` rule per leaf, left to
    /// right.
    pub fn rules(&self) -> Vec<String> {
        let mut rules = Vec::new();
        self.collect_rules(&mut Vec::new(), &mut rules);
        rules
    }

    fn collect_rules(&self, conditions: &mut Vec<String>, rules: &mut Vec<String>) {
        match &self.root {
            Node::Leaf(leaf) => rules.push(format!(
                "{} ==> Class={}",
                conditions.join(" AND "),
                leaf.predicted_value
            )),
            Node::Split(split) => {
                for (branch, child) in split.branches.iter().zip(&self.children) {
                    conditions.push(format!(
                        "{}{}{}",
                        split.attribute,
                        branch.comparator(),
                        branch.split_value()
                    ));
                    child.collect_rules(conditions, rules);
                    conditions.pop();
                }
            }
        }
    }

    /// Number of nodes of the tree.
    pub fn number_of_nodes(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(RegressionTree::number_of_nodes)
            .sum::<usize>()
    }

    /// Number of nodes on the longest path from the root to a leaf.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(RegressionTree::depth)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for RegressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.root)?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        Ok(())
    }
}

/// Largest number of examples a range may hold and still become a leaf
/// without trying to split it.
pub(crate) fn leaf_threshold(examples: usize, percent: usize) -> usize {
    examples * percent / 100
}

/// Recursive construction over the shared example buffer.
struct TreeBuilder<'a> {
    training_set: &'a mut TrainingSet,
    leaf_threshold: usize,
    next_id: usize,
}

impl TreeBuilder<'_> {
    fn build(&mut self, begin: usize, end: usize) -> RegressionTree {
        if end - begin + 1 <= self.leaf_threshold {
            return self.leaf(begin, end);
        }
        match best_split(self.training_set, begin, end) {
            Ok(candidate) if candidate.branches.len() > 1 => {
                let id = self.next_id();
                let children = candidate
                    .branches
                    .iter()
                    .map(|branch| self.build(branch.begin(), branch.end()))
                    .collect();
                RegressionTree {
                    root: Node::Split(SplitNode {
                        begin,
                        end,
                        id,
                        error: candidate.error,
                        kind: candidate.kind,
                        attribute: candidate.attribute,
                        branches: candidate.branches,
                    }),
                    children,
                }
            }
            _ => self.leaf(begin, end),
        }
    }

    fn leaf(&mut self, begin: usize, end: usize) -> RegressionTree {
        RegressionTree {
            root: Node::Leaf(LeafNode {
                begin,
                end,
                id: self.next_id(),
                error: self.training_set.sum_of_squared_errors(begin, end),
                predicted_value: self.training_set.mean(begin, end),
            }),
            children: Vec::new(),
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
