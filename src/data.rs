//! Attributes, examples and the training set the trees are learnt from.
mod attribute;
mod training_set;
mod value;

pub use attribute::{Attribute, AttributeKind};
pub use training_set::{Example, TrainingSet};
pub use value::Value;
