//! Regression trees trained from tabular data and queried through an
//! interactive, branch-by-branch prediction dialogue.
//!
//! The crate is organised leaf-first:
//! - [`data`]: attributes, examples and the in-place sortable [`TrainingSet`].
//! - [`table`]: sources the training set is loaded from.
//! - [`tree_model`]: node model, split search, the recursive builder and the
//!   [`RegressionTree`] itself.
//! - [`predict`]: the prediction walk state machine.
//! - [`persist`], [`protocol`], [`server`]: storage and the client sessions.
//!
//! # Example
//! ```
//! use regtree::{Attribute, Example, RegressionTree, TrainingSet, TreeSettings, Value};
//! let attributes = vec![Attribute::continuous("A", 0)];
//! let class = Attribute::continuous("y", 1);
//! let examples = vec![
//!     Example::new(vec![Value::Number(1.)], 10.),
//!     Example::new(vec![Value::Number(1.)], 12.),
//!     Example::new(vec![Value::Number(2.)], 100.),
//!     Example::new(vec![Value::Number(2.)], 102.),
//! ];
//! let mut set = TrainingSet::new(attributes, class, examples).unwrap();
//! let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 25 });
//! assert_eq!(tree.predict(&[Value::Number(1.)]).unwrap(), 11.);
//! assert_eq!(tree.predict(&[Value::Number(2.)]).unwrap(), 101.);
//! ```
pub mod data;
mod error;
pub mod logger;
pub mod persist;
pub mod predict;
pub mod protocol;
pub mod server;
pub mod settings;
pub mod table;
mod traits;
pub mod tree_model;
mod utils;

pub use data::{Attribute, AttributeKind, Example, TrainingSet, Value};
pub use error::{PersistError, PredictError, ProtocolError, RegTreeError, TrainingDataError};
pub use logger::{Logger, Verbosity};
pub use persist::TreeCodec;
pub use predict::{PredictionWalk, WalkState};
pub use protocol::{Channel, FramedChannel, MemoryChannel, Message};
pub use server::{Server, ServerError, Session};
pub use settings::{ServerSettings, SettingsError, TreeSettings};
pub use table::{Column, CsvTableSource, MemoryTableSource, TableSource};
pub use traits::RegressionModel;
pub use tree_model::{
    Comparator, LeafNode, Node, NoViableSplit, RegressionTree, RegressionTreeModel, SplitInfo,
    SplitKind, SplitNode,
};
