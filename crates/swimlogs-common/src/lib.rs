//! Swimlogs Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared domain enums, error types and logging bootstrap used by the
//! Swimlogs workspace members.
//!
//! - **Types**: start types and equipment, with the literals used on the wire
//!   and in the database
//! - **Logging**: `tracing` subscriber setup driven by environment variables
//! - **Error Handling**: parse errors for the shared types
//!
//! # Example
//!
//! ```no_run
//! use swimlogs_common::types::StartType;
//!
//! let start: StartType = "Interval".into();
//! assert!(start.requires_seconds());
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::{Equipment, StartType};
