use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Command to delete a training together with all of its sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTrainingCommand {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTrainingResponse {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteTrainingError {
    #[error("Training with id '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteTrainingResponse, DeleteTrainingError>> for DeleteTrainingCommand {}

impl crate::cqrs::middleware::Command for DeleteTrainingCommand {}

/// Sets go with the training through `ON DELETE CASCADE`.
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: DeleteTrainingCommand,
) -> Result<DeleteTrainingResponse, DeleteTrainingError> {
    let result = sqlx::query("DELETE FROM trainings WHERE id = $1")
        .bind(command.id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DeleteTrainingError::NotFound(command.id));
    }

    tracing::info!(training_id = %command.id, "Training deleted");

    Ok(DeleteTrainingResponse { id: command.id })
}
