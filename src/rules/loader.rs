use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use super::error::RuleError;
use super::types::SchemeRule;
use crate::config::InvalidRulePolicy;
use crate::database::models::SchemeBundle;

/// A parsed rule paired with the scheme it belongs to. `scheme_index`
/// points back into the bundle slice the rule was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedRule {
    pub scheme_index: usize,
    pub scheme_id: Uuid,
    pub scheme_name: String,
    pub rule: SchemeRule,
}

impl LoadedRule {
    /// Display name for outcomes: the rule's own name, or the scheme's
    /// name for unnamed rules.
    pub fn display_name(&self) -> &str {
        self.rule.name.as_deref().unwrap_or(&self.scheme_name)
    }
}

/// A scheme whose stored payload could not be used this run.
#[derive(Debug, Clone, Serialize)]
pub struct RuleIssue {
    pub scheme_id: Uuid,
    pub scheme_name: String,
    pub detail: String,
}

/// Loaded rules for one evaluation run, in scheme order.
#[derive(Debug, Default)]
pub struct RuleSet {
    pub loaded: Vec<LoadedRule>,
    pub issues: Vec<RuleIssue>,
}

/// Parse the stored rule payloads of `bundles` into a `RuleSet`.
///
/// Schemes with no declared rule (null or blank payload) are skipped
/// silently. Malformed payloads follow `policy`: `Skip` excludes the scheme
/// and reports it as an issue, `Fail` aborts naming the scheme. Either way
/// a bad payload never evaluates as "ineligible".
pub fn load_rules(bundles: &[SchemeBundle], policy: InvalidRulePolicy) -> Result<RuleSet, RuleError> {
    let mut ruleset = RuleSet::default();

    for (index, bundle) in bundles.iter().enumerate() {
        let scheme = &bundle.scheme;
        let payload = match scheme.eligibility_criteria.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => continue,
        };

        match SchemeRule::parse(payload) {
            Ok(rule) => ruleset.loaded.push(LoadedRule {
                scheme_index: index,
                scheme_id: scheme.id,
                scheme_name: scheme.name.clone(),
                rule,
            }),
            Err(err) => match policy {
                InvalidRulePolicy::Skip => {
                    warn!("Skipping rule for scheme '{}' ({}): {}", scheme.name, scheme.id, err);
                    ruleset.issues.push(RuleIssue {
                        scheme_id: scheme.id,
                        scheme_name: scheme.name.clone(),
                        detail: err.to_string(),
                    });
                }
                InvalidRulePolicy::Fail => return Err(err.for_scheme(scheme.id)),
            },
        }
    }

    Ok(ruleset)
}
