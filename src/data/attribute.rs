use core::fmt;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Domain of an explanatory attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Finite set of textual values, as declared by the table.
    Discrete { domain: BTreeSet<String> },
    /// Ordered numerical values.
    Continuous,
}

/// A column of the training set.
///
/// `index` is the fixed position of the column in every example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    index: usize,
    kind: AttributeKind,
}

impl Attribute {
    pub fn discrete<I, S>(name: impl Into<String>, index: usize, domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            index,
            kind: AttributeKind::Discrete {
                domain: domain.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn continuous(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            kind: AttributeKind::Continuous,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self.kind, AttributeKind::Discrete { .. })
    }

    /// Declared values of a discrete attribute, `None` for a continuous one.
    pub fn domain(&self) -> Option<&BTreeSet<String>> {
        match &self.kind {
            AttributeKind::Discrete { domain } => Some(domain),
            AttributeKind::Continuous => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
