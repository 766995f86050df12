//! CLI command implementations.

pub mod schedule;
pub mod worker;

use anyhow::{Context, Result};
use notifier_config::NotifierConfig;
use sqlx::PgPool;
use tracing::info;

/// Load configuration, applying the database URL override.
pub fn load_config(path: Option<&str>, database_url: Option<String>) -> Result<NotifierConfig> {
    let mut config = match path {
        Some(path) => notifier_config::load_config(path)
            .with_context(|| format!("Failed to load config file: {}", path))?,
        None => NotifierConfig::default(),
    };
    if let Some(url) = database_url {
        config.database.url = url;
    }
    Ok(config)
}

pub async fn connect(config: &NotifierConfig) -> Result<PgPool> {
    connect_with(config, config.database.max_connections).await
}

pub async fn connect_with(config: &NotifierConfig, max_connections: u32) -> Result<PgPool> {
    info!(max_connections, "Connecting to database...");
    let pool = notifier_db::create_pool(
        &config.database.url,
        max_connections,
        config.database.connect_timeout,
    )
    .await
    .context("Failed to connect to database")?;
    info!("Database connected");
    Ok(pool)
}

pub async fn migrate(config: &NotifierConfig) -> Result<()> {
    let pool = connect(config).await?;
    notifier_db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    println!("Migrations applied");
    Ok(())
}

pub fn validate(path: &str) -> Result<()> {
    match notifier_config::load_config(path) {
        Ok(_config) => {
            println!("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}
