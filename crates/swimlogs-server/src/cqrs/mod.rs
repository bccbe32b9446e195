//! Mediator wiring for training commands and queries

pub use mediator::DefaultAsyncMediator;
use sqlx::PgPool;

pub mod middleware;

pub type AppMediator = DefaultAsyncMediator;

pub fn build_mediator(pool: PgPool) -> AppMediator {
    DefaultAsyncMediator::builder()
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move { crate::features::trainings::commands::create::handle(pool, cmd).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move { crate::features::trainings::commands::update::handle(pool, cmd).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move { crate::features::trainings::commands::delete::handle(pool, cmd).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::trainings::queries::get::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::trainings::queries::list::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move {
                    crate::features::trainings::queries::list_in_range::handle(pool, query).await
                }
            }
        })
        .build()
}
