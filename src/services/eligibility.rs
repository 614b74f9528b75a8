use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::{config, InvalidRulePolicy};
use crate::database::models::SchemeBundle;
use crate::database::stores::{ApplicantStore, SchemeStore, StoreError};
use crate::rules::{
    load_rules, run_rules, FactProvider, RuleError, RuleEvent, RuleIssue, RuleOutcome,
};

/// Fact name under which the applicant's attributes are registered.
/// Stored rule payloads reference it in their leaf conditions.
pub const APPLICANT_FACT: &str = "applicant-details";

#[derive(Debug, Error)]
pub enum EligibilityError {
    #[error("Applicant not found: {0}")]
    ApplicantNotFound(Uuid),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Full result of one eligibility evaluation run.
#[derive(Debug, Serialize)]
pub struct EligibilityReport {
    pub applicant_id: Uuid,
    /// Schemes whose rule passed, with their benefits, in scheme order.
    pub eligible: Vec<SchemeBundle>,
    /// Per-rule outcomes for every scheme that carried a usable rule.
    pub outcomes: Vec<RuleOutcome>,
    /// Events of the passed rules, aligned with `eligible`.
    pub events: Vec<RuleEvent>,
    /// Schemes excluded because their stored payload was unusable.
    pub issues: Vec<RuleIssue>,
}

/// Evaluates every scheme's eligibility rule against one applicant.
///
/// Stores are injected so callers decide the backend; the service holds no
/// connection state of its own.
pub struct EligibilityService {
    applicants: Arc<dyn ApplicantStore>,
    schemes: Arc<dyn SchemeStore>,
    invalid_rule_policy: InvalidRulePolicy,
}

impl EligibilityService {
    pub fn new(applicants: Arc<dyn ApplicantStore>, schemes: Arc<dyn SchemeStore>) -> Self {
        Self {
            applicants,
            schemes,
            invalid_rule_policy: config().eligibility.invalid_rule_policy,
        }
    }

    /// Override the configured malformed-payload policy for this service.
    pub fn with_invalid_rule_policy(mut self, policy: InvalidRulePolicy) -> Self {
        self.invalid_rule_policy = policy;
        self
    }

    /// Evaluate all declared scheme rules against one applicant's attributes.
    ///
    /// Schemes without a declared rule never match. An unknown applicant is
    /// an error, not an empty report. With no schemes defined the report is
    /// empty and successful.
    pub async fn eligible_schemes(
        &self,
        applicant_id: Uuid,
    ) -> Result<EligibilityReport, EligibilityError> {
        let applicant = self
            .applicants
            .find_by_id(applicant_id)
            .await?
            .ok_or(EligibilityError::ApplicantNotFound(applicant_id))?;

        let bundles = self.schemes.find_all().await?;
        let ruleset = load_rules(&bundles, self.invalid_rule_policy)?;

        let mut facts = FactProvider::new();
        facts.register_value(APPLICANT_FACT, applicant.fact_value());

        let outcomes = run_rules(&ruleset, &facts).await?;

        let mut eligible = Vec::new();
        let mut events = Vec::new();
        for (outcome, loaded) in outcomes.iter().zip(&ruleset.loaded) {
            if outcome.passed {
                eligible.push(bundles[loaded.scheme_index].clone());
                events.push(loaded.rule.event.clone());
            }
        }

        if config().eligibility.log_outcomes {
            info!(
                "Applicant {} eligible for {} of {} evaluated schemes ({} issues)",
                applicant_id,
                eligible.len(),
                outcomes.len(),
                ruleset.issues.len()
            );
        }

        Ok(EligibilityReport {
            applicant_id,
            eligible,
            outcomes,
            events,
            issues: ruleset.issues,
        })
    }
}
