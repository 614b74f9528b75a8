use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::NewApplicant;
use crate::database::Stores;

#[derive(Subcommand)]
pub enum ApplicantCommands {
    #[command(about = "List all applicants")]
    List,

    #[command(about = "Show an applicant and their household members")]
    Show {
        #[arg(help = "Applicant ID")]
        id: Uuid,
    },

    #[command(about = "Create an applicant from stdin JSON")]
    Create,
}

pub async fn handle(cmd: ApplicantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let stores = Stores::postgres().await?;

    match cmd {
        ApplicantCommands::List => {
            let applicants = stores.applicants.find_all().await?;

            if applicants.is_empty() {
                return output_empty_collection(&output_format, "applicants", "No applicants found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ "applicants": applicants }))?
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "{:<38} {:<22} {:<30} {}",
                        "ID", "NAME", "EMAIL", "BIRTH DATE"
                    );
                    println!("{}", "-".repeat(100));

                    for applicant in &applicants {
                        println!(
                            "{:<38} {:<22} {:<30} {}",
                            applicant.id,
                            applicant.name,
                            applicant.email.as_deref().unwrap_or("-"),
                            applicant
                                .birth_date
                                .map(|date| date.to_string())
                                .unwrap_or_else(|| "-".to_string()),
                        );
                    }
                }
            }

            Ok(())
        }
        ApplicantCommands::Show { id } => {
            let applicant = stores
                .applicants
                .find_by_id(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Applicant '{}' not found", id))?;

            let household_members = match applicant.household_id {
                Some(household_id) => stores
                    .applicants
                    .find_by_household(household_id)
                    .await?
                    .into_iter()
                    .filter(|member| member.id != applicant.id)
                    .collect(),
                None => Vec::new(),
            };

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "applicant": applicant,
                            "household_members": household_members
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("Applicant: {}", applicant.name);
                    println!("ID: {}", applicant.id);
                    if let Some(email) = &applicant.email {
                        println!("Email: {}", email);
                    }
                    if let Some(mobile_no) = &applicant.mobile_no {
                        println!("Mobile: {}", mobile_no);
                    }
                    if let Some(birth_date) = applicant.birth_date {
                        println!("Birth Date: {}", birth_date);
                    }
                    if let Some(gender_id) = applicant.gender_id {
                        println!("Gender ID: {}", gender_id);
                    }
                    if let Some(employment_status_id) = applicant.employment_status_id {
                        println!("Employment Status ID: {}", employment_status_id);
                    }
                    if let Some(marital_status_id) = applicant.marital_status_id {
                        println!("Marital Status ID: {}", marital_status_id);
                    }
                    match applicant.household_id {
                        Some(household_id) => {
                            println!("Household: {}", household_id);
                            if household_members.is_empty() {
                                println!("Household Members: none");
                            } else {
                                println!("Household Members:");
                                for member in &household_members {
                                    println!("  {} ({})", member.name, member.id);
                                }
                            }
                        }
                        None => println!("Household: none"),
                    }
                }
            }

            Ok(())
        }
        ApplicantCommands::Create => {
            let payload = read_payload(None)?;
            let new_applicant: NewApplicant = serde_json::from_str(&payload)?;
            let applicant = stores.applicants.insert(new_applicant).await?;

            output_success(
                &output_format,
                &format!("Applicant '{}' created", applicant.name),
                Some(json!({ "applicant": applicant })),
            )
        }
    }
}
