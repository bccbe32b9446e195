//! Training summaries within a calendar date range
//!
//! Days are taken in UTC. Both ends of the range are inclusive, so a week is
//! Monday through Sunday.

use chrono::{Datelike, Days, NaiveDate};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::trainings::types::{TrainingDetail, TRAINING_DETAIL_COLUMNS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTrainingDetailsInRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingDetailsInRangeResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub items: Vec<TrainingDetail>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListTrainingDetailsInRangeError {
    #[error("Range start {from} is after its end {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
    #[error("No calendar week contains {0}")]
    OutOfRange(NaiveDate),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<TrainingDetailsInRangeResponse, ListTrainingDetailsInRangeError>>
    for ListTrainingDetailsInRangeQuery
{
}

impl crate::cqrs::middleware::Query for ListTrainingDetailsInRangeQuery {}

impl ListTrainingDetailsInRangeQuery {
    /// The Monday to Sunday week containing `day`
    pub fn week_of(day: NaiveDate) -> Result<Self, ListTrainingDetailsInRangeError> {
        let since_monday = u64::from(day.weekday().num_days_from_monday());
        let from = day
            .checked_sub_days(Days::new(since_monday))
            .ok_or(ListTrainingDetailsInRangeError::OutOfRange(day))?;
        let to = from
            .checked_add_days(Days::new(6))
            .ok_or(ListTrainingDetailsInRangeError::OutOfRange(day))?;
        Ok(Self { from, to })
    }

    pub fn validate(&self) -> Result<(), ListTrainingDetailsInRangeError> {
        if self.from > self.to {
            return Err(ListTrainingDetailsInRangeError::InvalidRange {
                from: self.from,
                to: self.to,
            });
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListTrainingDetailsInRangeQuery,
) -> Result<TrainingDetailsInRangeResponse, ListTrainingDetailsInRangeError> {
    query.validate()?;

    let items = sqlx::query_as::<_, TrainingDetail>(&format!(
        r#"
        SELECT {TRAINING_DETAIL_COLUMNS}
        FROM trainings
        WHERE (start AT TIME ZONE 'UTC')::date BETWEEN $1 AND $2
        ORDER BY start, duration_min, total_distance, created_at
        "#
    ))
    .bind(query.from)
    .bind(query.to)
    .fetch_all(&pool)
    .await?;

    Ok(TrainingDetailsInRangeResponse {
        from: query.from,
        to: query.to,
        items,
    })
}
