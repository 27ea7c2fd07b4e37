//! Interactive prediction: the tree is walked from the root, one branch
//! choice at a time, until a leaf gives the answer.
use crate::{Node, PredictError, RegressionTree, SplitNode};

/// What the walk needs next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkState<'a> {
    /// A leaf was reached.
    Answer(f64),
    /// A split node waits for the index of the branch to follow.
    AwaitingChoice(&'a SplitNode),
}

/// Position of an interactive prediction in a tree.
///
/// ```
/// use regtree::{Attribute, Example, RegressionTree, TrainingSet, TreeSettings, Value, WalkState};
/// let mut set = TrainingSet::new(
///     vec![Attribute::continuous("A", 0)],
///     Attribute::continuous("y", 1),
///     vec![
///         Example::new(vec![Value::Number(1.)], 10.),
///         Example::new(vec![Value::Number(1.)], 12.),
///         Example::new(vec![Value::Number(2.)], 100.),
///         Example::new(vec![Value::Number(2.)], 102.),
///     ],
/// )
/// .unwrap();
/// let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 25 });
/// let mut walk = tree.walk();
/// match walk.state() {
///     WalkState::AwaitingChoice(split) => assert_eq!(split.query(), "0:A<=1\n1:A>1"),
///     WalkState::Answer(_) => unreachable!(),
/// }
/// walk.choose(1).unwrap();
/// assert_eq!(walk.state(), WalkState::Answer(101.));
/// ```
#[derive(Debug, Clone)]
pub struct PredictionWalk<'a> {
    current: &'a RegressionTree,
}

impl<'a> PredictionWalk<'a> {
    pub fn new(tree: &'a RegressionTree) -> Self {
        Self { current: tree }
    }

    pub fn state(&self) -> WalkState<'a> {
        match self.current.root() {
            Node::Leaf(leaf) => WalkState::Answer(leaf.predicted_value()),
            Node::Split(split) => WalkState::AwaitingChoice(split),
        }
    }

    /// Follows branch `answer` of the current split node.
    ///
    /// An out of range answer leaves the walk where it is.
    pub fn choose(&mut self, answer: i32) -> Result<(), PredictError> {
        let Node::Split(split) = self.current.root() else {
            return Err(PredictError::NotAwaitingChoice);
        };
        let max = split.branches().len().saturating_sub(1);
        let child = usize::try_from(answer)
            .map_err(|_| PredictError::BranchBelowRange { answer, max })?;
        self.current = self
            .current
            .child(child)
            .ok_or(PredictError::BranchAboveRange { answer, max })?;
        Ok(())
    }

    /// Subtree the walk currently stands on.
    pub fn current(&self) -> &'a RegressionTree {
        self.current
    }
}
