use std::fmt::{self, Display};

/// Errors produced by model parsers.
///
/// Request-facing code never surfaces these: unknown query values are
/// normalized to their defaults instead (see [`crate::query`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownSortField(String),
    UnknownSortOrder(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownSortField(raw) => {
                write!(f, "unknown sort field: {raw}")
            }
            ModelError::UnknownSortOrder(raw) => {
                write!(f, "unknown sort order: {raw}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
