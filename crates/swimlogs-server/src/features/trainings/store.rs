//! Persistence port for set rows
//!
//! The mapper only needs three operations on the `sets` relation, so they sit
//! behind [`SetRowStore`]. Postgres connections (and therefore open
//! transactions, through `&mut *tx`) implement it directly.

use async_trait::async_trait;
use sqlx::PgConnection;
use std::collections::HashSet;
use uuid::Uuid;

use super::mapper::SetRow;

#[async_trait]
pub trait SetRowStore: Send {
    /// Which of `candidates` already exist as sets of `training_id`
    async fn existing_set_ids(
        &mut self,
        training_id: Uuid,
        candidates: &[Uuid],
    ) -> Result<HashSet<Uuid>, sqlx::Error>;

    async fn insert_set(&mut self, row: &SetRow) -> Result<(), sqlx::Error>;

    async fn update_set(&mut self, row: &SetRow) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl SetRowStore for PgConnection {
    async fn existing_set_ids(
        &mut self,
        training_id: Uuid,
        candidates: &[Uuid],
    ) -> Result<HashSet<Uuid>, sqlx::Error> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM sets
            WHERE training_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(training_id)
        .bind(candidates)
        .fetch_all(&mut *self)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn insert_set(&mut self, row: &SetRow) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO sets (
                id, training_id, parent_set_id, set_order, sub_set_order, repeat,
                distance_meters, description, start_type, start_seconds, equipment,
                total_distance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::start_type, $10, $11::equipment[], $12)
            "#,
        )
        .bind(row.id)
        .bind(row.training_id)
        .bind(row.parent_set_id)
        .bind(row.set_order)
        .bind(row.sub_set_order)
        .bind(row.repeat)
        .bind(row.distance_meters)
        .bind(&row.description)
        .bind(&row.start_type)
        .bind(row.start_seconds)
        .bind(&row.equipment)
        .bind(row.total_distance)
        .execute(&mut *self)
        .await?;

        Ok(())
    }

    async fn update_set(&mut self, row: &SetRow) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE sets
            SET parent_set_id = $3,
                set_order = $4,
                sub_set_order = $5,
                repeat = $6,
                distance_meters = $7,
                description = $8,
                start_type = $9::start_type,
                start_seconds = $10,
                equipment = $11::equipment[],
                total_distance = $12
            WHERE id = $1 AND training_id = $2
            "#,
        )
        .bind(row.id)
        .bind(row.training_id)
        .bind(row.parent_set_id)
        .bind(row.set_order)
        .bind(row.sub_set_order)
        .bind(row.repeat)
        .bind(row.distance_meters)
        .bind(&row.description)
        .bind(&row.start_type)
        .bind(row.start_seconds)
        .bind(&row.equipment)
        .bind(row.total_distance)
        .execute(&mut *self)
        .await?;

        Ok(())
    }
}

/// In-memory store keeping rows in insertion order
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemorySetStore {
    pub rows: Vec<SetRow>,
}

#[cfg(test)]
#[async_trait]
impl SetRowStore for MemorySetStore {
    async fn existing_set_ids(
        &mut self,
        training_id: Uuid,
        candidates: &[Uuid],
    ) -> Result<HashSet<Uuid>, sqlx::Error> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.training_id == training_id && candidates.contains(&row.id))
            .map(|row| row.id)
            .collect())
    }

    async fn insert_set(&mut self, row: &SetRow) -> Result<(), sqlx::Error> {
        self.rows.push(row.clone());
        Ok(())
    }

    async fn update_set(&mut self, row: &SetRow) -> Result<(), sqlx::Error> {
        if let Some(stored) = self
            .rows
            .iter_mut()
            .find(|stored| stored.id == row.id && stored.training_id == row.training_id)
        {
            *stored = row.clone();
        }
        Ok(())
    }
}
