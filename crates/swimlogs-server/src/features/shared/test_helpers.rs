//! Database fixtures for tests
//!
//! ```rust,ignore
//! use crate::features::shared::test_helpers::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_something(pool: PgPool) -> sqlx::Result<()> {
//!     let training = TestTraining::new()
//!         .with_duration_min(45)
//!         .insert(&pool)
//!         .await?;
//!     // ... test logic ...
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Builder for a bare `trainings` row, without sets
#[derive(Debug, Clone)]
pub struct TestTraining {
    pub id: Uuid,
    pub start: DateTime<Utc>,
    pub duration_min: i32,
    pub total_distance: i32,
    pub version: i32,
}

impl Default for TestTraining {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTraining {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            start: Utc
                .with_ymd_and_hms(2024, 3, 1, 18, 30, 0)
                .single()
                .unwrap_or_else(Utc::now),
            duration_min: 60,
            total_distance: 0,
            version: 0,
        }
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn with_duration_min(mut self, duration_min: i32) -> Self {
        self.duration_min = duration_min;
        self
    }

    /// Store the row as if it had already been edited `version` times
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query(
            r#"
            INSERT INTO trainings (id, start, duration_min, total_distance, version)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(self.id)
        .bind(self.start)
        .bind(self.duration_min)
        .bind(self.total_distance)
        .bind(self.version)
        .execute(pool)
        .await?;

        Ok(self)
    }
}
