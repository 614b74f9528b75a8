use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::condition::evaluate;
use super::error::RuleError;
use super::facts::FactProvider;
use super::loader::RuleSet;

/// Result of evaluating one scheme's rule. Unnamed rules report under
/// their scheme's name.
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    pub scheme_id: Uuid,
    pub scheme_index: usize,
    pub rule_name: String,
    pub passed: bool,
}

/// Evaluate every loaded rule in order against the run's facts.
///
/// An evaluation error aborts the run tagged with the owning scheme; a rule
/// that cannot be evaluated is never reported as merely "failed".
pub async fn run_rules(ruleset: &RuleSet, facts: &FactProvider) -> Result<Vec<RuleOutcome>, RuleError> {
    let mut outcomes = Vec::with_capacity(ruleset.loaded.len());

    for loaded in &ruleset.loaded {
        let passed = evaluate(&loaded.rule.conditions, facts)
            .await
            .map_err(|err| err.for_scheme(loaded.scheme_id))?;

        debug!(
            "Rule '{}' for scheme {}: {}",
            loaded.display_name(),
            loaded.scheme_id,
            if passed { "passed" } else { "failed" }
        );

        outcomes.push(RuleOutcome {
            scheme_id: loaded.scheme_id,
            scheme_index: loaded.scheme_index,
            rule_name: loaded.display_name().to_string(),
            passed,
        });
    }

    Ok(outcomes)
}
