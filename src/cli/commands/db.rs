use anyhow::Context;
use clap::Subcommand;
use sqlx::Executor;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Tables and indexes, all `IF NOT EXISTS`.
pub const SCHEMA: &str = include_str!("../../../schema.sql");

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create any missing tables from schema.sql")]
    ApplySchema,

    #[command(about = "Check that DATABASE_URL is reachable")]
    Ping,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    match cmd {
        DbCommands::ApplySchema => {
            // Simple-query protocol: the whole file runs as one multi-statement batch.
            pool.execute(SCHEMA).await.context("failed to apply schema")?;
            output_success(output_format, "Schema applied", None)
        }
        DbCommands::Ping => {
            DatabaseManager::health_check(&pool).await?;
            output_success(output_format, "Database reachable", None)
        }
    }
}
