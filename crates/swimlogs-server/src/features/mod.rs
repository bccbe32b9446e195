//! Feature modules implementing the SwimLogs API
//!
//! Each feature is a vertical slice with its own commands, queries and routes.
//!
//! # Features
//!
//! - **trainings**: swim trainings and their set trees
//! - **shared**: helpers used across slices
//!
//! # Architecture
//!
//! - `commands/` - Write operations (create, update, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Shared types
//!
//! Commands and queries implement `mediator::Request`, see [`crate::cqrs`].

pub mod shared;
pub mod trainings;

use axum::{extract::FromRef, Router};
use shared::PageLimits;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
    /// Bounds applied to paginated listings
    pub pages: PageLimits,
}

impl FromRef<FeatureState> for sqlx::PgPool {
    fn from_ref(state: &FeatureState) -> Self {
        state.db.clone()
    }
}

impl FromRef<FeatureState> for PageLimits {
    fn from_ref(state: &FeatureState) -> Self {
        state.pages
    }
}

/// Creates the API router with all feature routes mounted
///
/// - `/trainings` - Trainings and their sets
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/trainings", trainings::trainings_routes())
        .with_state(state)
}
