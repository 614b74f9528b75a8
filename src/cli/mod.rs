pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "fasms")]
#[command(about = "FASMS CLI - Operate the financial assistance scheme eligibility backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Evaluate scheme eligibility for applicants")]
    Eligibility {
        #[command(subcommand)]
        cmd: commands::eligibility::EligibilityCommands,
    },

    #[command(about = "Inspect applicants and their households")]
    Applicant {
        #[command(subcommand)]
        cmd: commands::applicant::ApplicantCommands,
    },

    #[command(about = "Inspect schemes and manage their eligibility rules")]
    Scheme {
        #[command(subcommand)]
        cmd: commands::scheme::SchemeCommands,
    },

    #[command(about = "Load fixture data through the stores")]
    Seed {
        #[command(subcommand)]
        cmd: commands::seed::SeedCommands,
    },

    #[command(about = "Database health and connectivity")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Eligibility { cmd } => commands::eligibility::handle(cmd, output_format).await,
        Commands::Applicant { cmd } => commands::applicant::handle(cmd, output_format).await,
        Commands::Scheme { cmd } => commands::scheme::handle(cmd, output_format).await,
        Commands::Seed { cmd } => commands::seed::handle(cmd, output_format).await,
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
    }
}
