use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Benefit {
    pub id: Uuid,
    pub scheme_id: Uuid,
    pub name: String,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. The id is optional so fixtures can pin reproducible ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBenefit {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub scheme_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}
