//! Fetch training query
//!
//! Reads the training and all of its sets with one joined query and rebuilds
//! the tree from the ordered rows.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::trainings::{
    mapper::{self, SetRow},
    types::Training,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTrainingQuery {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetTrainingError {
    #[error("Training with id '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Training, GetTrainingError>> for GetTrainingQuery {}

impl crate::cqrs::middleware::Query for GetTrainingQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetTrainingQuery) -> Result<Training, GetTrainingError> {
    let records = sqlx::query_as::<_, TrainingSetRecord>(
        r#"
        SELECT t.id, t.start, t.duration_min, t.total_distance, t.version,
               s.id AS set_id, s.parent_set_id, s.set_order, s.sub_set_order,
               s.repeat, s.distance_meters, s.description,
               s.start_type::text AS start_type, s.start_seconds,
               s.equipment::text[] AS equipment,
               s.total_distance AS set_total_distance
        FROM trainings t
        LEFT JOIN sets s ON s.training_id = t.id
        WHERE t.id = $1
        ORDER BY s.set_order, s.sub_set_order NULLS FIRST
        "#,
    )
    .bind(query.id)
    .fetch_all(&pool)
    .await?;

    let Some(first) = records.first() else {
        return Err(GetTrainingError::NotFound(query.id));
    };

    let mut training = Training {
        id: Some(first.id),
        start: first.start,
        duration_min: first.duration_min,
        total_distance: first.total_distance,
        version: Some(first.version),
        sets: Vec::new(),
    };

    let rebuilt = mapper::reconstruct(records.into_iter().filter_map(TrainingSetRecord::into_set_row));
    if !rebuilt.orphans.is_empty() {
        tracing::warn!(
            training_id = %query.id,
            orphans = rebuilt.orphans.len(),
            "Training read with unattached set rows"
        );
    }
    training.sets = rebuilt.sets;

    Ok(training)
}

/// One row of the training/sets join; set columns are NULL for a training
/// without sets
#[derive(Debug, sqlx::FromRow)]
struct TrainingSetRecord {
    id: Uuid,
    start: DateTime<Utc>,
    duration_min: i32,
    total_distance: i32,
    version: i32,
    set_id: Option<Uuid>,
    parent_set_id: Option<Uuid>,
    set_order: Option<i32>,
    sub_set_order: Option<i32>,
    repeat: Option<i32>,
    distance_meters: Option<i32>,
    description: Option<String>,
    start_type: Option<String>,
    start_seconds: Option<i32>,
    equipment: Option<Vec<String>>,
    set_total_distance: Option<i32>,
}

impl TrainingSetRecord {
    fn into_set_row(self) -> Option<SetRow> {
        Some(SetRow {
            id: self.set_id?,
            training_id: self.id,
            parent_set_id: self.parent_set_id,
            set_order: self.set_order?,
            sub_set_order: self.sub_set_order,
            repeat: self.repeat?,
            distance_meters: self.distance_meters,
            description: self.description,
            start_type: self.start_type?,
            start_seconds: self.start_seconds,
            equipment: self.equipment,
            total_distance: self.set_total_distance?,
        })
    }
}
