//! Database error translation
//!
//! Constraint failures raised by Postgres are client triggerable. They are
//! mapped onto the closed [`ConstraintKind`] set so handlers and the API layer
//! never look at driver specific codes.
//!
//! ```rust,ignore
//! impl From<sqlx::Error> for CreateTrainingError {
//!     fn from(error: sqlx::Error) -> Self {
//!         match classify(error) {
//!             DbFailure::Constraint(violation) => Self::Constraint(violation),
//!             DbFailure::Other(error) => Self::Database(error),
//!         }
//!     }
//! }
//! ```

use serde::Serialize;
use sqlx::{error::ErrorKind, Error as SqlxError};
use std::fmt;

/// SQLSTATE raised when text does not parse as the target type, e.g. an enum
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    NotNull,
    InvalidEnum,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ConstraintKind::Unique => "A record with the same key already exists",
            ConstraintKind::ForeignKey => "A referenced record does not exist",
            ConstraintKind::Check => "A value is outside its allowed range",
            ConstraintKind::NotNull => "A required value is missing",
            ConstraintKind::InvalidEnum => "A value is not one of the allowed choices",
        };
        f.write_str(message)
    }
}

/// A storage constraint rejected a write
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    /// Name of the violated constraint when the driver reports one
    pub constraint: Option<String>,
}

/// Result of classifying a database error
#[derive(Debug)]
pub enum DbFailure {
    Constraint(ConstraintViolation),
    /// Anything that is not a constraint failure
    Other(SqlxError),
}

/// Split constraint failures from unexpected database errors
pub fn classify(error: SqlxError) -> DbFailure {
    let SqlxError::Database(ref db_err) = error else {
        return DbFailure::Other(error);
    };

    let kind = match db_err.kind() {
        ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
        ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
        ErrorKind::CheckViolation => Some(ConstraintKind::Check),
        ErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
        _ if db_err.code().as_deref() == Some(INVALID_TEXT_REPRESENTATION) => {
            Some(ConstraintKind::InvalidEnum)
        },
        _ => None,
    };

    match kind {
        Some(kind) => DbFailure::Constraint(ConstraintViolation {
            kind,
            constraint: db_err.constraint().map(str::to_string),
        }),
        None => DbFailure::Other(error),
    }
}
