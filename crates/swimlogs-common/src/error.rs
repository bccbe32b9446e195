//! Error types shared across Swimlogs crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Invalid {kind}: '{value}'")]
    InvalidValue { kind: &'static str, value: String },
}

impl CommonError {
    pub fn invalid(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            kind,
            value: value.into(),
        }
    }
}
