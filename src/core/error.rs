use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("unknown debt strategy: {0:?} (expected snowball, avalanche or minimums)")]
    UnknownStrategy(String),
    #[error("{0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
