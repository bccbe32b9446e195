//! SwimLogs Server Library
//!
//! HTTP service for recording swim trainings.
//!
//! # Overview
//!
//! A training is a dated session made of ordered sets. A set either describes
//! a single swim (`repeat x distanceMeters`) or groups sub-sets that are swum
//! `repeat` times. The server validates submitted trees, recomputes every
//! distance, stores the tree in flat `sets` rows and rebuilds it on read.
//!
//! # Architecture
//!
//! - **Commands** (create, edit, delete) and **Queries** (fetch, list details)
//!   live under [`features::trainings`] and implement `mediator::Request`
//! - [`features::trainings::aggregation`], [`features::trainings::validation`] and
//!   [`features::trainings::mapper`] are pure and tested without a database
//! - Axum routes are mounted under `/api/v1`
//!
//! # Example
//!
//! ```no_run
//! use swimlogs_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!     api::serve(config, pool).await
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod features;
pub mod middleware;
