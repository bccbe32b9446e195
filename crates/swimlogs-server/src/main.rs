//! SwimLogs Server - Main entry point

use anyhow::Result;
use swimlogs_common::logging::{init_logging, LogConfig};
use tracing::info;

use swimlogs_server::{api, config::Config, db};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("swimlogs-server".to_string())
        .filter_directives("swimlogs_server=debug,tower_http=debug,sqlx=warn".to_string())
        .build()
        .with_env_overrides()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting SwimLogs Server");

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    api::serve(config, pool).await
}
