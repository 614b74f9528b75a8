use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Benefit;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Scheme {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Serialized rule payload, null until a rule is declared for the scheme.
    pub eligibility_criteria: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scheme {
    /// Whether a rule payload is declared for this scheme.
    /// Whitespace-only payloads count as undeclared.
    pub fn has_rule(&self) -> bool {
        self.eligibility_criteria
            .as_deref()
            .map_or(false, |raw| !raw.trim().is_empty())
    }
}

/// A scheme together with the benefits it grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeBundle {
    pub scheme: Scheme,
    pub benefits: Vec<Benefit>,
}

/// Insert payload. The id is optional so fixtures can pin reproducible ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScheme {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub eligibility_criteria: Option<String>,
}
