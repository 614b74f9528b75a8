use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::Stores;
use crate::services::SchemeRuleService;

#[derive(Subcommand)]
pub enum SchemeCommands {
    #[command(about = "List all schemes")]
    List,

    #[command(about = "Show a scheme with its benefits and rule")]
    Show {
        #[arg(help = "Scheme ID")]
        id: Uuid,
    },

    #[command(about = "Manage the eligibility rule declared for a scheme")]
    Rule {
        #[command(subcommand)]
        cmd: RuleCommands,
    },
}

#[derive(Subcommand)]
pub enum RuleCommands {
    #[command(about = "Show the declared rule")]
    Get {
        #[arg(help = "Scheme ID")]
        scheme_id: Uuid,
    },

    #[command(about = "Declare a rule for a scheme that has none")]
    Set {
        #[arg(help = "Scheme ID")]
        scheme_id: Uuid,
        #[arg(long, help = "Read the rule payload from a file instead of stdin")]
        file: Option<String>,
    },

    #[command(about = "Replace the declared rule")]
    Replace {
        #[arg(help = "Scheme ID")]
        scheme_id: Uuid,
        #[arg(long, help = "Read the rule payload from a file instead of stdin")]
        file: Option<String>,
    },

    #[command(about = "Remove the declared rule")]
    Clear {
        #[arg(help = "Scheme ID")]
        scheme_id: Uuid,
    },
}

pub async fn handle(cmd: SchemeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let stores = Stores::postgres().await?;

    match cmd {
        SchemeCommands::List => {
            let bundles = stores.schemes.find_all().await?;

            if bundles.is_empty() {
                return output_empty_collection(&output_format, "schemes", "No schemes found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ "schemes": bundles }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<32} {:<10} {}", "ID", "NAME", "RULE", "BENEFITS");
                    println!("{}", "-".repeat(92));

                    for bundle in &bundles {
                        let rule_marker = if bundle.scheme.has_rule() { "declared" } else { "-" };
                        println!(
                            "{:<38} {:<32} {:<10} {}",
                            bundle.scheme.id,
                            bundle.scheme.name,
                            rule_marker,
                            bundle.benefits.len()
                        );
                    }
                }
            }

            Ok(())
        }
        SchemeCommands::Show { id } => {
            let bundle = stores
                .schemes
                .find_by_id(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Scheme '{}' not found", id))?;

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "scheme": bundle }))?);
                }
                OutputFormat::Text => {
                    println!("Scheme: {}", bundle.scheme.name);
                    println!("ID: {}", bundle.scheme.id);
                    if let Some(description) = &bundle.scheme.description {
                        if !description.is_empty() {
                            println!("Description: {}", description);
                        }
                    }
                    if bundle.benefits.is_empty() {
                        println!("Benefits: none");
                    } else {
                        println!("Benefits:");
                        for benefit in &bundle.benefits {
                            match benefit.amount {
                                Some(amount) => println!("  {}: {}", benefit.name, amount),
                                None => println!("  {}", benefit.name),
                            }
                        }
                    }
                    match bundle.scheme.eligibility_criteria.as_deref() {
                        Some(raw) if !raw.trim().is_empty() => {
                            println!("Rule:");
                            match serde_json::from_str::<serde_json::Value>(raw) {
                                Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                                Err(_) => println!("{}", raw),
                            }
                        }
                        _ => println!("Rule: not declared"),
                    }
                }
            }

            Ok(())
        }
        SchemeCommands::Rule { cmd } => handle_rule(cmd, output_format, stores).await,
    }
}

async fn handle_rule(
    cmd: RuleCommands,
    output_format: OutputFormat,
    stores: Stores,
) -> anyhow::Result<()> {
    let service = SchemeRuleService::new(stores.schemes.clone());

    match cmd {
        RuleCommands::Get { scheme_id } => {
            let payload = service.rule_payload_of(scheme_id).await?;

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "scheme_id": scheme_id,
                            "rule": payload
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
            }

            Ok(())
        }
        RuleCommands::Set { scheme_id, file } => {
            let payload = read_payload(file.as_deref())?;
            let scheme = service.set_rule(scheme_id, &payload).await?;

            output_success(
                &output_format,
                &format!("Rule declared for scheme '{}'", scheme.name),
                Some(json!({ "scheme": scheme })),
            )
        }
        RuleCommands::Replace { scheme_id, file } => {
            let payload = read_payload(file.as_deref())?;
            let scheme = service.replace_rule(scheme_id, &payload).await?;

            output_success(
                &output_format,
                &format!("Rule replaced for scheme '{}'", scheme.name),
                Some(json!({ "scheme": scheme })),
            )
        }
        RuleCommands::Clear { scheme_id } => {
            let scheme = service.clear_rule(scheme_id).await?;

            output_success(
                &output_format,
                &format!("Rule cleared for scheme '{}'", scheme.name),
                Some(json!({ "scheme": scheme })),
            )
        }
    }
}
