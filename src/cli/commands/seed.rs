use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::Stores;
use crate::fixtures::{self, FixtureFile};

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Load the built-in demo dataset")]
    Demo,

    #[command(about = "Load fixture data from a YAML file")]
    File {
        #[arg(help = "Path to the fixture YAML file")]
        path: PathBuf,
    },
}

pub async fn handle(cmd: SeedCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let fixture = match &cmd {
        SeedCommands::Demo => fixtures::demo(),
        SeedCommands::File { path } => FixtureFile::from_path(path)?,
    };

    let stores = Stores::postgres().await?;
    let summary = fixtures::apply(&fixture, &stores).await?;

    output_success(
        &output_format,
        &format!(
            "Seeded {} applicant(s) and {} scheme(s)",
            summary.applicants, summary.schemes
        ),
        Some(json!({ "summary": summary })),
    )
}
