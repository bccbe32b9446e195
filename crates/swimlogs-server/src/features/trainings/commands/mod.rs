pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateTrainingCommand, CreateTrainingError};
pub use delete::{DeleteTrainingCommand, DeleteTrainingError, DeleteTrainingResponse};
pub use update::{UpdateTrainingCommand, UpdateTrainingError};
