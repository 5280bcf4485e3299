use thiserror::Error;

/// Errors resolving a dot-delimited content path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Content path is empty")]
    Empty,

    #[error("Content path `{path}` has an empty segment")]
    EmptySegment { path: String },

    #[error("Content root is not an object")]
    RootNotObject,

    #[error("Segment `{segment}` is not a valid list index")]
    InvalidIndex { segment: String },

    #[error("Index {index} is out of bounds for a list of {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Content that does not fit the schema of its section kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind} content: {message}")]
pub struct ContentError {
    pub kind: String,
    pub message: String,
}

/// Common Result alias for model operations
pub type ModelResult<T> = Result<T, PathError>;
