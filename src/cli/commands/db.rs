use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Check database connectivity")]
    Ping {
        #[arg(long, help = "Database name to ping instead of the primary database")]
        database: Option<String>,
    },
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Ping { database } => {
            match database {
                Some(name) => {
                    DatabaseManager::health_check_named(&name).await?;
                    output_success(
                        &output_format,
                        &format!("Database '{}' is reachable", name),
                        Some(json!({ "database": name })),
                    )
                }
                None => {
                    DatabaseManager::health_check().await?;
                    output_success(&output_format, "Primary database is reachable", None)
                }
            }
        }
    }
}
