use serde_json::{json, Value};

use fasms_eligibility::database::models::{NewApplicant, NewScheme, Scheme};
use fasms_eligibility::database::{StoreError, Stores};
use fasms_eligibility::services::APPLICANT_FACT;

/// Leaf condition against the applicant fact.
pub fn leaf(path: &str, operator: &str, value: Value) -> Value {
    json!({
        "fact": APPLICANT_FACT,
        "operator": operator,
        "path": path,
        "value": value
    })
}

/// Minimal valid rule payload around the given conditions.
pub fn rule(conditions: Value) -> Value {
    json!({
        "name": "test-rule",
        "conditions": conditions,
        "event": {
            "type": "eligible",
            "params": { "message": "Applicant is eligible" }
        }
    })
}

/// Applicant carrying the attributes scheme rules compare against.
pub fn applicant(name: &str, gender_id: i32, employment_status_id: i32) -> NewApplicant {
    NewApplicant {
        id: None,
        household_id: None,
        employment_status_id: Some(employment_status_id),
        marital_status_id: Some(1),
        gender_id: Some(gender_id),
        name: name.to_string(),
        email: None,
        mobile_no: None,
        birth_date: None,
    }
}

/// Insert a scheme whose stored rule payload is the given JSON.
pub async fn insert_scheme(
    stores: &Stores,
    name: &str,
    payload: Option<&Value>,
) -> Result<Scheme, StoreError> {
    stores
        .schemes
        .insert(NewScheme {
            id: None,
            name: name.to_string(),
            description: None,
            eligibility_criteria: payload.map(|value| value.to_string()),
        })
        .await
}
