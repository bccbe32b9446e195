use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::pagination::{
    PageLimits, PaginationError, PaginationMetadata, PaginationParams,
};
use crate::features::trainings::types::{TrainingDetail, TRAINING_DETAIL_COLUMNS};

/// Page through training summaries, most recent start first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTrainingDetailsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    /// Server side bounds, never taken from the request
    #[serde(skip)]
    pub limits: PageLimits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTrainingDetailsResponse {
    pub items: Vec<TrainingDetail>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum ListTrainingDetailsError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListTrainingDetailsResponse, ListTrainingDetailsError>>
    for ListTrainingDetailsQuery
{
}

impl crate::cqrs::middleware::Query for ListTrainingDetailsQuery {}

impl ListTrainingDetailsQuery {
    pub fn validate(&self) -> Result<(), ListTrainingDetailsError> {
        self.pagination.validate(self.limits)?;
        Ok(())
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListTrainingDetailsQuery,
) -> Result<ListTrainingDetailsResponse, ListTrainingDetailsError> {
    query.validate()?;

    let page = query.pagination.page();
    let per_page = query.pagination.per_page(query.limits);
    let offset = query.pagination.offset(query.limits);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trainings")
        .fetch_one(&pool)
        .await?;

    let items = sqlx::query_as::<_, TrainingDetail>(&format!(
        r#"
        SELECT {TRAINING_DETAIL_COLUMNS}
        FROM trainings
        ORDER BY start DESC, id
        LIMIT $1
        OFFSET $2
        "#
    ))
    .bind(per_page)
    .bind(offset)
    .fetch_all(&pool)
    .await?;

    Ok(ListTrainingDetailsResponse {
        items,
        pagination: PaginationMetadata::new(page, per_page, total),
    })
}
