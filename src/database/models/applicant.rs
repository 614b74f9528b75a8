use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Applicant {
    pub id: Uuid,
    pub household_id: Option<Uuid>,
    pub employment_status_id: Option<i32>,
    pub marital_status_id: Option<i32>,
    pub gender_id: Option<i32>,
    pub name: String,
    pub email: Option<String>,
    pub mobile_no: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Applicant {
    /// Attribute bag the rule engine resolves `$.`-paths against.
    ///
    /// Keys use the platform's canonical attribute spellings, which is what
    /// stored rule payloads address (`$.GenderId`, `$.EmploymentStatusId`).
    /// Attributes that were never captured serialize as JSON null.
    pub fn fact_value(&self) -> Value {
        json!({
            "id": self.id,
            "HouseholdId": self.household_id,
            "EmploymentStatusId": self.employment_status_id,
            "MaritalStatusId": self.marital_status_id,
            "GenderId": self.gender_id,
            "name": self.name,
            "email": self.email,
            "mobile_no": self.mobile_no,
            "birth_date": self.birth_date,
        })
    }
}

/// Insert payload. The id is optional so fixtures can pin reproducible ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplicant {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub household_id: Option<Uuid>,
    #[serde(default)]
    pub employment_status_id: Option<i32>,
    #[serde(default)]
    pub marital_status_id: Option<i32>,
    #[serde(default)]
    pub gender_id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}
