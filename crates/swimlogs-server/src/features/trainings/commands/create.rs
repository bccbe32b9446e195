//! Create training command
//!
//! Validates the submitted tree, recomputes every distance and stores the
//! training with all of its sets in one transaction.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::error_helpers::{classify, ConstraintViolation, DbFailure};
use crate::features::trainings::{
    aggregation, mapper,
    types::{Training, TrainingDetail, TRAINING_DETAIL_COLUMNS},
    validation::{self, InvalidTraining},
};

/// Command to create a training from a client submitted tree
///
/// Ids and totals present in the payload are ignored; every set is stored under
/// a fresh id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreateTrainingCommand {
    pub training: Training,
}

/// Errors that can occur when creating a training
#[derive(Debug, thiserror::Error)]
pub enum CreateTrainingError {
    /// The tree failed validation, nothing was written
    #[error("{0}")]
    Validation(#[from] InvalidTraining),
    /// A storage constraint rejected the write
    #[error("Constraint violation: {0}")]
    Constraint(ConstraintViolation),
    /// A database error occurred
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for CreateTrainingError {
    fn from(error: sqlx::Error) -> Self {
        match classify(error) {
            DbFailure::Constraint(violation) => Self::Constraint(violation),
            DbFailure::Other(error) => Self::Database(error),
        }
    }
}

impl Request<Result<TrainingDetail, CreateTrainingError>> for CreateTrainingCommand {}

impl crate::cqrs::middleware::Command for CreateTrainingCommand {}

impl CreateTrainingCommand {
    pub fn validate(&self) -> Result<(), CreateTrainingError> {
        validation::validate(&self.training)?;
        Ok(())
    }
}

/// Handles the create training command
///
/// # Errors
///
/// - `Validation` - The tree breaks one or more rules, see [`InvalidTraining`]
/// - `Constraint` - A row was rejected by a storage constraint
/// - `Database` - Any other database failure
#[tracing::instrument(skip(pool, command), fields(sets = command.training.sets.len()))]
pub async fn handle(
    pool: PgPool,
    command: CreateTrainingCommand,
) -> Result<TrainingDetail, CreateTrainingError> {
    command.validate()?;

    let training = aggregation::recompute(command.training);
    let id = Uuid::new_v4();

    let mut tx = pool.begin().await?;

    let detail = sqlx::query_as::<_, TrainingDetail>(&format!(
        r#"
        INSERT INTO trainings (id, start, duration_min, total_distance)
        VALUES ($1, $2, $3, $4)
        RETURNING {TRAINING_DETAIL_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(training.start)
    .bind(training.duration_min)
    .bind(training.total_distance)
    .fetch_one(&mut *tx)
    .await?;

    let rows = mapper::insert_tree(&mut *tx, id, &training).await?;

    tx.commit().await?;

    tracing::info!(
        training_id = %id,
        sets = rows.len(),
        total_distance = detail.total_distance,
        "Training created"
    );

    Ok(detail)
}
