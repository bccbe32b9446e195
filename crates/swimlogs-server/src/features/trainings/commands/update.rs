//! Edit training command
//!
//! Replaces the training's scalar fields and upserts its set tree under an
//! optimistic version check. Sets that are absent from the submitted tree are
//! not removed.

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

/// Command to edit a stored training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTrainingCommand {
    pub id: Uuid,
    pub training: Training,
}

/// Errors that can occur when editing a training
#[derive(Debug, thiserror::Error)]
pub enum UpdateTrainingError {
    #[error("{0}")]
    Validation(#[from] InvalidTraining),
    #[error("Training with id '{0}' not found")]
    NotFound(Uuid),
    /// The stored version moved on since the client read it
    #[error("Training '{id}' was modified concurrently, expected version {expected}")]
    Conflict { id: Uuid, expected: i32 },
    #[error("Constraint violation: {0}")]
    Constraint(ConstraintViolation),
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for UpdateTrainingError {
    fn from(error: sqlx::Error) -> Self {
        match classify(error) {
            DbFailure::Constraint(violation) => Self::Constraint(violation),
            DbFailure::Other(error) => Self::Database(error),
        }
    }
}

impl Request<Result<TrainingDetail, UpdateTrainingError>> for UpdateTrainingCommand {}

impl crate::cqrs::middleware::Command for UpdateTrainingCommand {}

impl UpdateTrainingCommand {
    /// Returns the version the client expects to overwrite
    pub fn validate(&self) -> Result<i32, UpdateTrainingError> {
        Ok(validation::validate_edit(&self.training)?)
    }
}

/// Handles the edit training command
///
/// # Errors
///
/// - `Validation` - The tree breaks one or more rules or carries no version
/// - `NotFound` - No training with this id exists
/// - `Conflict` - The stored version differs from the submitted one
/// - `Constraint` - A row was rejected by a storage constraint
/// - `Database` - Any other database failure
#[tracing::instrument(skip(pool, command), fields(training_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateTrainingCommand,
) -> Result<TrainingDetail, UpdateTrainingError> {
    let expected = command.validate()?;
    let id = command.id;
    let training = aggregation::recompute(command.training);

    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, TrainingDetail>(&format!(
        r#"
        UPDATE trainings
        SET start = $3,
            duration_min = $4,
            total_distance = $5,
            version = version + 1,
            modified_at = NOW()
        WHERE id = $1 AND version = $2
        RETURNING {TRAINING_DETAIL_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(expected)
    .bind(training.start)
    .bind(training.duration_min)
    .bind(training.total_distance)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(detail) = updated else {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM trainings WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        return Err(if exists {
            UpdateTrainingError::Conflict { id, expected }
        } else {
            UpdateTrainingError::NotFound(id)
        });
    };

    let summary = mapper::upsert_tree(&mut *tx, id, &training).await?;

    tx.commit().await?;

    tracing::info!(
        training_id = %id,
        version = detail.version,
        inserted = summary.inserted,
        updated = summary.updated,
        "Training updated"
    );

    Ok(detail)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestTraining;
    use crate::features::trainings::commands::create;
    use crate::features::trainings::types::fixtures::*;
    use crate::features::trainings::validation::FieldError;

    #[test]
    fn test_validation_requires_version() {
        let cmd = UpdateTrainingCommand {
            id: Uuid::new_v4(),
            training: sample_training(),
        };
        match cmd.validate() {
            Err(UpdateTrainingError::Validation(invalid)) => {
                assert_eq!(invalid.version, Some(FieldError::VersionRequired));
            },
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_returns_expected_version() {
        let mut training = sample_training();
        training.version = Some(3);
        let cmd = UpdateTrainingCommand {
            id: Uuid::new_v4(),
            training,
        };
        assert_eq!(cmd.validate().unwrap(), 3);
    }

    #[test]
    fn test_error_display() {
        let id = Uuid::nil();
        let err = UpdateTrainingError::Conflict { id, expected: 2 };
        assert!(err.to_string().contains("expected version 2"));
        assert!(UpdateTrainingError::NotFound(id).to_string().contains("not found"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_not_found(pool: PgPool) -> sqlx::Result<()> {
        let mut training = sample_training();
        training.version = Some(0);
        let id = Uuid::new_v4();

        let result = handle(pool, UpdateTrainingCommand { id, training }).await;
        assert!(matches!(result, Err(UpdateTrainingError::NotFound(missing)) if missing == id));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_stale_version_conflicts(pool: PgPool) -> sqlx::Result<()> {
        let stored = TestTraining::new().with_version(2).insert(&pool).await?;
        let mut training = sample_training();
        training.version = Some(1);

        let result = handle(
            pool.clone(),
            UpdateTrainingCommand {
                id: stored.id,
                training,
            },
        )
        .await;
        assert!(matches!(
            result,
            Err(UpdateTrainingError::Conflict { expected: 1, .. })
        ));

        let version: i32 = sqlx::query_scalar("SELECT version FROM trainings WHERE id = $1")
            .bind(stored.id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(version, 2);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_updates_in_place_and_bumps_version(pool: PgPool) -> sqlx::Result<()> {
        let created = create::handle(
            pool.clone(),
            create::CreateTrainingCommand {
                training: training(vec![leaf(0, 2, 100)]),
            },
        )
        .await
        .unwrap();

        let set_id: Uuid = sqlx::query_scalar("SELECT id FROM sets WHERE training_id = $1")
            .bind(created.id)
            .fetch_one(&pool)
            .await?;

        let mut edited = training(vec![leaf(0, 4, 100), leaf(1, 1, 50)]);
        edited.sets[0].id = Some(set_id);
        edited.sets[1].id = Some(Uuid::new_v4());
        edited.version = Some(created.version);

        let detail = handle(
            pool.clone(),
            UpdateTrainingCommand {
                id: created.id,
                training: edited,
            },
        )
        .await
        .unwrap();
        assert_eq!(detail.version, created.version + 1);
        assert_eq!(detail.total_distance, 450);

        let repeat: i32 = sqlx::query_scalar("SELECT repeat FROM sets WHERE id = $1")
            .bind(set_id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(repeat, 4);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sets WHERE training_id = $1")
            .bind(created.id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 2);
        Ok(())
    }
}
