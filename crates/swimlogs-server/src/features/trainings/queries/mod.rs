pub mod get;
pub mod list;
pub mod list_in_range;

pub use get::{GetTrainingError, GetTrainingQuery};
pub use list::{ListTrainingDetailsError, ListTrainingDetailsQuery, ListTrainingDetailsResponse};
pub use list_in_range::{
    ListTrainingDetailsInRangeError, ListTrainingDetailsInRangeQuery,
    TrainingDetailsInRangeResponse,
};
