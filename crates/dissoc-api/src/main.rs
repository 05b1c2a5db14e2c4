use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;

use dissoc_api::{init_tracing, router, AppConfig, AppState, LogConfig};
use dissoc_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let log_config = LogConfig::from_env();
    let _file_guard = init_tracing(&log_config);
    info!(
        log_format = %log_config.format,
        log_file = log_config.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Pool connects on first use
    let db = Database::connect_lazy(&config.database_url, &config.schema, config.pool_config())
        .context("Failed to configure database pool")?;
    info!(
        subsystem = "api",
        schema = %db.schema(),
        max_connections = config.max_connections,
        image_path = %config.image_path.display(),
        "Study store configured"
    );

    let app = router(AppState::from_database(&db, config.image_path.clone()));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
