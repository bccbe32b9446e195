//! Shared utilities and types for feature modules
//!
//! - **error_helpers**: translation of storage constraint failures
//! - **pagination**: page parameters and response metadata for list queries
//! - **test_helpers**: database fixtures (test-only)

pub mod error_helpers;
pub mod pagination;

#[cfg(test)]
pub mod test_helpers;

// Re-export commonly used types
pub use error_helpers::{classify, ConstraintKind, ConstraintViolation, DbFailure};
pub use pagination::{PageLimits, PaginationError, PaginationMetadata, PaginationParams};
