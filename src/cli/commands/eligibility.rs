use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::OutputFormat;
use crate::database::models::{Application, NewApplication};
use crate::database::Stores;
use crate::services::{EligibilityService, APPLICANT_FACT};

#[derive(Subcommand)]
pub enum EligibilityCommands {
    #[command(about = "Evaluate every declared scheme rule against an applicant")]
    Run {
        #[arg(help = "Applicant ID")]
        applicant_id: Uuid,
        #[arg(long, help = "Record the outcome for each evaluated scheme as an application")]
        record: bool,
    },

    #[command(about = "Show the fact values an applicant exposes to rule conditions")]
    Facts {
        #[arg(help = "Applicant ID")]
        applicant_id: Uuid,
    },
}

pub async fn handle(cmd: EligibilityCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        EligibilityCommands::Run { applicant_id, record } => {
            let stores = Stores::postgres().await?;
            let service =
                EligibilityService::new(stores.applicants.clone(), stores.schemes.clone());
            let report = service.eligible_schemes(applicant_id).await?;

            let mut recorded = None;
            if record {
                for outcome in &report.outcomes {
                    let value = if outcome.passed {
                        Application::OUTCOME_ELIGIBLE
                    } else {
                        Application::OUTCOME_NOT_ELIGIBLE
                    };
                    stores
                        .applications
                        .record(NewApplication {
                            id: None,
                            applicant_id,
                            scheme_id: outcome.scheme_id,
                            outcome: value.to_string(),
                        })
                        .await?;
                }
                recorded = Some(report.outcomes.len());
            }

            match output_format {
                OutputFormat::Json => {
                    let mut response = serde_json::to_value(&report)?;
                    if let Some(count) = recorded {
                        response["recorded"] = json!(count);
                    }
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                OutputFormat::Text => {
                    println!(
                        "Applicant {}: eligible for {} of {} evaluated scheme(s)",
                        report.applicant_id,
                        report.eligible.len(),
                        report.outcomes.len()
                    );

                    for (bundle, event) in report.eligible.iter().zip(&report.events) {
                        println!();
                        println!("Scheme: {} ({})", bundle.scheme.name, bundle.scheme.id);
                        println!("Event: {}", event.params.message);
                        if !bundle.benefits.is_empty() {
                            println!("Benefits:");
                            for benefit in &bundle.benefits {
                                match benefit.amount {
                                    Some(amount) => println!("  {}: {}", benefit.name, amount),
                                    None => println!("  {}", benefit.name),
                                }
                            }
                        }
                    }

                    for issue in &report.issues {
                        println!();
                        println!("Skipped scheme '{}': {}", issue.scheme_name, issue.detail);
                    }

                    if let Some(count) = recorded {
                        println!();
                        println!("Recorded {} application outcome(s)", count);
                    }
                }
            }

            Ok(())
        }
        EligibilityCommands::Facts { applicant_id } => {
            let stores = Stores::postgres().await?;
            let applicant = stores
                .applicants
                .find_by_id(applicant_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Applicant '{}' not found", applicant_id))?;
            let facts = applicant.fact_value();

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "fact": APPLICANT_FACT,
                            "value": facts
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("Fact '{}' for applicant {}:", APPLICANT_FACT, applicant.name);
                    println!("{}", serde_json::to_string_pretty(&facts)?);
                }
            }

            Ok(())
        }
    }
}
