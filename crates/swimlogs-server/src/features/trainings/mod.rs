//! Training feature
//!
//! The set tree model, distance aggregation, validation and the mapping
//! between the tree and flat `sets` rows form the core of this module. The
//! commands, queries and routes are a thin layer on top of it.

pub mod aggregation;
pub mod commands;
pub mod mapper;
pub mod queries;
pub mod routes;
pub mod store;
pub mod types;
pub mod validation;

pub use routes::trainings_routes;
pub use types::{SetLevel, Training, TrainingDetail, TrainingSet};
pub use validation::{FieldError, InvalidSet, InvalidTraining};
