use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Grouping record for applicants living at the same address.
/// Carries no attributes of its own; membership lives on the applicant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Household {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
