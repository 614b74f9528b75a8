use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::database::models::Scheme;
use crate::database::stores::{SchemeStore, StoreError};
use crate::rules::{RuleError, SchemeRule};

#[derive(Debug, Error)]
pub enum SchemeRuleError {
    #[error("Scheme not found: {0}")]
    SchemeNotFound(Uuid),

    #[error("No rule is declared for scheme {0}")]
    RuleNotDeclared(Uuid),

    #[error("A rule is already declared for scheme {0}; replace it instead")]
    RuleAlreadyDeclared(Uuid),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rule authoring over the scheme store.
///
/// Every write validates the payload before persisting, so an unparseable
/// rule can never reach storage through this service.
pub struct SchemeRuleService {
    schemes: Arc<dyn SchemeStore>,
}

impl SchemeRuleService {
    pub fn new(schemes: Arc<dyn SchemeStore>) -> Self {
        Self { schemes }
    }

    /// The declared rule of a scheme, parsed. A missing scheme and a scheme
    /// without a rule are distinct errors.
    pub async fn rule_of(&self, scheme_id: Uuid) -> Result<SchemeRule, SchemeRuleError> {
        let payload = self.rule_payload_of(scheme_id).await?;
        Ok(SchemeRule::from_value(&payload)?)
    }

    /// The declared rule of a scheme as stored JSON, for display and export.
    pub async fn rule_payload_of(&self, scheme_id: Uuid) -> Result<Value, SchemeRuleError> {
        let scheme = self.scheme_of(scheme_id).await?;
        let payload = scheme
            .eligibility_criteria
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(SchemeRuleError::RuleNotDeclared(scheme_id))?;
        Ok(serde_json::from_str(payload).map_err(RuleError::JsonError)?)
    }

    /// Declare a rule for a scheme that has none yet.
    pub async fn set_rule(&self, scheme_id: Uuid, payload: &str) -> Result<Scheme, SchemeRuleError> {
        let canonical = Self::validate(payload)?;
        let scheme = self.scheme_of(scheme_id).await?;
        if scheme.has_rule() {
            return Err(SchemeRuleError::RuleAlreadyDeclared(scheme_id));
        }

        let updated = self.update(scheme_id, Some(canonical)).await?;
        info!("Declared rule for scheme {}", scheme_id);
        Ok(updated)
    }

    /// Replace the rule of a scheme, declared or not.
    pub async fn replace_rule(&self, scheme_id: Uuid, payload: &str) -> Result<Scheme, SchemeRuleError> {
        let canonical = Self::validate(payload)?;
        let updated = self.update(scheme_id, Some(canonical)).await?;
        info!("Replaced rule for scheme {}", scheme_id);
        Ok(updated)
    }

    /// Remove the declared rule. The scheme stays; it simply never matches
    /// until a new rule is declared.
    pub async fn clear_rule(&self, scheme_id: Uuid) -> Result<Scheme, SchemeRuleError> {
        let updated = self.update(scheme_id, None).await?;
        info!("Cleared rule for scheme {}", scheme_id);
        Ok(updated)
    }

    async fn scheme_of(&self, scheme_id: Uuid) -> Result<Scheme, SchemeRuleError> {
        let bundle = self
            .schemes
            .find_by_id(scheme_id)
            .await?
            .ok_or(SchemeRuleError::SchemeNotFound(scheme_id))?;
        Ok(bundle.scheme)
    }

    async fn update(&self, scheme_id: Uuid, payload: Option<String>) -> Result<Scheme, SchemeRuleError> {
        match self.schemes.update_rule(scheme_id, payload).await {
            Ok(scheme) => Ok(scheme),
            Err(StoreError::NotFound { .. }) => Err(SchemeRuleError::SchemeNotFound(scheme_id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Parse-validate a payload and return its canonical serialization.
    /// Canonicalizing keeps whatever metadata keys the payload carried.
    fn validate(payload: &str) -> Result<String, SchemeRuleError> {
        let value: Value = serde_json::from_str(payload).map_err(RuleError::JsonError)?;
        SchemeRule::from_value(&value)?;
        Ok(value.to_string())
    }
}
