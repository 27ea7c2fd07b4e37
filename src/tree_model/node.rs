use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{Attribute, Value};

/// Test carried by a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Equal,
    LessOrEqual,
    Greater,
}

impl Comparator {
    /// Whether `value` satisfies `value <comparator> split_value`.
    pub fn test(self, value: &Value, split_value: &Value) -> bool {
        match self {
            Comparator::Equal => value == split_value,
            Comparator::LessOrEqual => value <= split_value,
            Comparator::Greater => value > split_value,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::LessOrEqual => "<=",
            Comparator::Greater => ">",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing branch of a split node, covering the examples
/// `[begin, end]` of its parent's range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitInfo {
    split_value: Value,
    begin: usize,
    end: usize,
    child_number: usize,
    comparator: Comparator,
}

impl SplitInfo {
    pub(crate) fn new(
        split_value: Value,
        begin: usize,
        end: usize,
        child_number: usize,
        comparator: Comparator,
    ) -> Self {
        Self {
            split_value,
            begin,
            end,
            child_number,
            comparator,
        }
    }

    pub fn split_value(&self) -> &Value {
        &self.split_value
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn child_number(&self) -> usize {
        self.child_number
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Number of examples covered by the branch.
    pub fn number_of_examples(&self) -> usize {
        self.end - self.begin + 1
    }
}

impl fmt::Display for SplitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "child {} split value{}{} [Examples:{}-{}]",
            self.child_number, self.comparator, self.split_value, self.begin, self.end
        )
    }
}

/// Kind of attribute a split node tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitKind {
    /// One branch per value present in the range.
    Discrete,
    /// Two-way `<=` / `>` test on a threshold.
    Continuous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNode {
    pub(crate) begin: usize,
    pub(crate) end: usize,
    pub(crate) id: usize,
    pub(crate) error: f64,
    pub(crate) predicted_value: f64,
}

impl LeafNode {
    /// Mean class value of the examples the leaf covers.
    pub fn predicted_value(&self) -> f64 {
        self.predicted_value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitNode {
    pub(crate) begin: usize,
    pub(crate) end: usize,
    pub(crate) id: usize,
    pub(crate) error: f64,
    pub(crate) kind: SplitKind,
    pub(crate) attribute: Attribute,
    pub(crate) branches: Vec<SplitInfo>,
}

impl SplitNode {
    pub fn kind(&self) -> SplitKind {
        self.kind
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn branches(&self) -> &[SplitInfo] {
        &self.branches
    }

    pub fn branch(&self, child: usize) -> &SplitInfo {
        &self.branches[child]
    }

    /// Branch list shown to a client, one `index:attribute<cmp><value>` line
    /// per branch.
    pub fn query(&self) -> String {
        self.branches
            .iter()
            .enumerate()
            .map(|(i, branch)| {
                format!(
                    "{i}:{}{}{}",
                    self.attribute, branch.comparator, branch.split_value
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Index of the branch whose test `value` satisfies.
    pub fn test_condition(&self, value: &Value) -> Option<usize> {
        self.branches
            .iter()
            .position(|branch| branch.comparator.test(value, &branch.split_value))
    }
}

/// Node of a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf(LeafNode),
    Split(SplitNode),
}

impl Node {
    /// Construction order of the node, for display only.
    pub fn id(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.id,
            Node::Split(split) => split.id,
        }
    }

    pub fn begin(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.begin,
            Node::Split(split) => split.begin,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.end,
            Node::Split(split) => split.end,
        }
    }

    /// Sum of squared errors of the node: over its own range for a leaf, the
    /// sum over its branches for a split.
    pub fn error(&self) -> f64 {
        match self {
            Node::Leaf(leaf) => leaf.error,
            Node::Split(split) => split.error,
        }
    }

    pub fn number_of_children(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Split(split) => split.branches.len(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(leaf) => write!(
                f,
                "LEAF #{}: class={} [Examples:{}-{}] error:{}",
                leaf.id, leaf.predicted_value, leaf.begin, leaf.end, leaf.error
            ),
            Node::Split(split) => {
                let kind = match split.kind {
                    SplitKind::Discrete => "DISCRETE",
                    SplitKind::Continuous => "CONTINUOUS",
                };
                write!(
                    f,
                    "{kind} SPLIT #{}: attribute={} [Examples:{}-{}] split error:{}",
                    split.id, split.attribute, split.begin, split.end, split.error
                )?;
                for branch in &split.branches {
                    write!(f, "\n\t{branch}")?;
                }
                Ok(())
            }
        }
    }
}
