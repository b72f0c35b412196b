use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::{Config, Environment};

/// Open the connection pool. It is built once at startup and shared through `AppState`.
///
/// Production gets a larger pool. Statement logging is only on in development.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &Config) -> anyhow::Result<DatabaseConnection> {
    let (max, min) = match config.environment {
        Environment::Production => (20, 2),
        Environment::Staging | Environment::Development => (5, 1),
    };

    let mut opts = ConnectOptions::new(&config.database_url);
    opts.max_connections(max)
        .min_connections(min)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(config.environment == Environment::Development);

    Database::connect(opts)
        .await
        .context("Failed to connect to the database")
}
