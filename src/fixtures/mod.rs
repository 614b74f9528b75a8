use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use uuid::{uuid, Uuid};

use crate::database::models::{NewApplicant, NewBenefit, NewScheme};
use crate::database::stores::{StoreError, Stores};
use crate::rules::{RuleError, SchemeRule};

/// Demo applicant ids, pinned so walkthroughs are reproducible.
pub const DEMO_JANE_KWOK: Uuid = uuid!("1b44bfd4-265a-40d9-bacd-6659c6bbb9db");
pub const DEMO_JON_TAN: Uuid = uuid!("e6b52c5e-b9d0-468c-9baf-533c1f2f2f80");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Fixture file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fixture parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Fixture rule for scheme '{scheme}' is invalid: {source}")]
    InvalidRule {
        scheme: String,
        #[source]
        source: RuleError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Seed dataset in the shape the YAML fixture files use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub households: Vec<HouseholdFixture>,
    #[serde(default)]
    pub applicants: Vec<NewApplicant>,
    #[serde(default)]
    pub schemes: Vec<SchemeFixture>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HouseholdFixture {
    #[serde(default)]
    pub id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeFixture {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Inline rule payload, validated and stored in canonical JSON.
    #[serde(default)]
    pub rule: Option<Value>,
    #[serde(default)]
    pub benefits: Vec<BenefitFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitFixture {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FixtureSummary {
    pub households: usize,
    pub applicants: usize,
    pub schemes: usize,
    pub benefits: usize,
    pub rules: usize,
}

impl FixtureFile {
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// Load a fixture into the given stores.
///
/// All inline rules are validated before anything is written, so a broken
/// fixture never half-applies.
pub async fn apply(fixture: &FixtureFile, stores: &Stores) -> Result<FixtureSummary, FixtureError> {
    for scheme in &fixture.schemes {
        if let Some(rule) = &scheme.rule {
            SchemeRule::from_value(rule).map_err(|source| FixtureError::InvalidRule {
                scheme: scheme.name.clone(),
                source,
            })?;
        }
    }

    let mut summary = FixtureSummary::default();

    for household in &fixture.households {
        stores.households.create(household.id).await?;
        summary.households += 1;
    }

    for applicant in &fixture.applicants {
        stores.applicants.insert(applicant.clone()).await?;
        summary.applicants += 1;
    }

    for scheme in &fixture.schemes {
        let criteria = scheme.rule.as_ref().map(|rule| rule.to_string());
        if criteria.is_some() {
            summary.rules += 1;
        }

        let created = stores
            .schemes
            .insert(NewScheme {
                id: scheme.id,
                name: scheme.name.clone(),
                description: scheme.description.clone(),
                eligibility_criteria: criteria,
            })
            .await?;
        summary.schemes += 1;

        for benefit in &scheme.benefits {
            stores
                .schemes
                .insert_benefit(NewBenefit {
                    id: benefit.id,
                    scheme_id: created.id,
                    name: benefit.name.clone(),
                    amount: benefit.amount,
                    description: benefit.description.clone(),
                })
                .await?;
            summary.benefits += 1;
        }
    }

    info!(
        "Applied fixture: {} households, {} applicants, {} schemes ({} with rules), {} benefits",
        summary.households, summary.applicants, summary.schemes, summary.rules, summary.benefits
    );
    Ok(summary)
}

/// Built-in demo dataset: two applicants and two schemes, one of which
/// declares the employed-male rule. Jon Tan matches it, Jane Kwok does not.
pub fn demo() -> FixtureFile {
    FixtureFile {
        households: vec![],
        applicants: vec![
            NewApplicant {
                id: Some(DEMO_JANE_KWOK),
                household_id: None,
                employment_status_id: Some(3),
                marital_status_id: Some(2),
                gender_id: Some(2),
                name: "Jane Kwok".to_string(),
                email: Some("janekwok88@gmail.com".to_string()),
                mobile_no: Some("+6512345678".to_string()),
                birth_date: "1988-05-02".parse().ok(),
            },
            NewApplicant {
                id: Some(DEMO_JON_TAN),
                household_id: None,
                employment_status_id: Some(2),
                marital_status_id: Some(1),
                gender_id: Some(1),
                name: "Jon Tan".to_string(),
                email: Some("jontanwenghou@gmail.com".to_string()),
                mobile_no: Some("+6587654321".to_string()),
                birth_date: "2003-08-08".parse().ok(),
            },
        ],
        schemes: vec![
            SchemeFixture {
                id: None,
                name: "CPF Medisave Top-up Scheme".to_string(),
                description: Some("Medisave support for employed male applicants".to_string()),
                rule: Some(demo_rule()),
                benefits: vec![BenefitFixture {
                    id: None,
                    name: "CPF Medisave Top-up".to_string(),
                    amount: Some(Decimal::new(50000, 2)),
                    description: Some("One-time Medisave account top-up".to_string()),
                }],
            },
            SchemeFixture {
                id: None,
                name: "School Meal Vouchers".to_string(),
                description: Some("Meal subsidy for school-age dependents".to_string()),
                rule: None,
                benefits: vec![],
            },
        ],
    }
}

fn demo_rule() -> Value {
    json!({
        "name": "employed-male-scheme",
        "conditions": {
            "all": [
                {
                    "fact": "applicant-details",
                    "operator": "equal",
                    "value": 1,
                    "path": "$.GenderId"
                },
                {
                    "fact": "applicant-details",
                    "operator": "in",
                    "value": [2, 3],
                    "path": "$.EmploymentStatusId"
                }
            ]
        },
        "event": {
            "type": "eligible",
            "params": {
                "message": "Applicant is eligible for CPF Medisave Benefit"
            }
        }
    })
}
