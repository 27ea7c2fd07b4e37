use thiserror_no_std::Error;

use crate::settings::SettingsError;

/// Failures while acquiring a training set from a table source.
#[derive(Error, Debug)]
pub enum TrainingDataError {
    /// The requested table is unknown to the source.
    #[error("table `{0}` does not exist")]
    TableNotFound(String),

    /// Table names may only contain ASCII letters, digits, `_` and `-`.
    #[error("`{0}` is not a valid table name")]
    InvalidTableName(String),

    #[error("table `{table}` has {columns} usable column(s), at least two are needed")]
    TooFewColumns { table: String, columns: usize },

    #[error("there are no examples in table `{0}`")]
    EmptyTable(String),

    #[error("the training set contains no examples")]
    NoExamples,

    #[error("table `{table}` contains a null value in column `{column}` (row {row})")]
    NullValue {
        table: String,
        row: usize,
        column: String,
    },

    /// The last column, used as class attribute, must be numerical.
    #[error("the class column `{column}` of table `{table}` is not numerical")]
    NonNumericClass { table: String, column: String },

    #[error("value at row {row} of column `{column}` in table `{table}` does not match the column type")]
    CellType {
        table: String,
        row: usize,
        column: String,
    },

    /// NaN and infinities cannot be ordered into splits nor averaged.
    #[error("value at row {row} of column `{column}` in table `{table}` is not a finite number")]
    NonFiniteValue {
        table: String,
        row: usize,
        column: String,
    },

    #[error("example {row} has {got} explanatory values, expected {expected}")]
    Arity {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("{rows} rows of explanatory values but {targets} class values")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures while walking a tree towards a prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("branch {answer} is below 0: the answer should be an integer between 0 and {max}")]
    BranchBelowRange { answer: i32, max: usize },

    #[error("branch {answer} is above {max}: the answer should be an integer between 0 and {max}")]
    BranchAboveRange { answer: i32, max: usize },

    /// A branch was chosen while the walk already reached a leaf.
    #[error("the walk reached a leaf, no branch can be chosen")]
    NotAwaitingChoice,

    #[error("value {value} of attribute `{attribute}` matches no branch")]
    UnknownValue { attribute: String, value: String },

    #[error("{got} explanatory values given, the tree was trained on {expected}")]
    Arity { expected: usize, got: usize },

    #[error("the model is not fitted")]
    NotFitted,
}

/// Failures of the tree storage codec.
#[derive(Error, Debug)]
pub enum PersistError {
    /// Wrong magic bytes.
    #[error("not a regression tree file")]
    NotATree,

    #[error("tree format {major}.{minor} is not supported")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The payload decodes but does not describe a walkable tree.
    #[error("malformed tree at node #{id}: {reason}")]
    MalformedTree { id: usize, reason: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Failures of the message channel. They end the session.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    #[error("the peer closed the channel")]
    Disconnected,

    #[error("frame of {size} bytes exceeds the {max} bytes limit")]
    FrameTooLarge { size: usize, max: usize },

    #[error("expected {expected}, received {got}")]
    UnexpectedMessage { expected: &'static str, got: String },
}

/// Error manager.
#[derive(Error, Debug)]
pub enum RegTreeError {
    #[error(transparent)]
    TrainingData(#[from] TrainingDataError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
