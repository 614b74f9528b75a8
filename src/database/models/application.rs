use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recorded eligibility outcome for one applicant against one scheme.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub scheme_id: Uuid,
    pub outcome: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub const OUTCOME_ELIGIBLE: &'static str = "eligible";
    pub const OUTCOME_NOT_ELIGIBLE: &'static str = "not_eligible";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub applicant_id: Uuid,
    pub scheme_id: Uuid,
    pub outcome: String,
}
