mod common;

use anyhow::Result;
use serde_json::json;

use fasms_eligibility::config::InvalidRulePolicy;
use fasms_eligibility::database::models::{NewScheme, Scheme};
use fasms_eligibility::database::Stores;
use fasms_eligibility::rules::{load_rules, ConditionNode, RuleError, SchemeRule};

/// Scheme whose stored payload is raw text, for exercising payloads that
/// never went through rule validation.
async fn insert_raw_scheme(stores: &Stores, name: &str, payload: &str) -> Result<Scheme> {
    Ok(stores
        .schemes
        .insert(NewScheme {
            id: None,
            name: name.to_string(),
            description: None,
            eligibility_criteria: Some(payload.to_string()),
        })
        .await?)
}

// Stored payloads are untrusted data: anything the parser does not
// recognize fails parsing instead of evaluating to false. Loading pairs
// each parsed rule with the scheme that declared it.

#[test]
fn parses_a_complete_payload() -> Result<()> {
    let payload = common::rule(json!({
        "all": [
            common::leaf("$.GenderId", "equal", json!(1)),
            common::leaf("$.EmploymentStatusId", "in", json!([2, 3])),
        ]
    }));

    let rule = SchemeRule::from_value(&payload)?;
    assert_eq!(rule.name.as_deref(), Some("test-rule"));
    assert_eq!(rule.label(), "test-rule");
    assert_eq!(rule.event.event_type, "eligible");
    assert_eq!(rule.event.params.message, "Applicant is eligible");
    assert!(matches!(rule.conditions, ConditionNode::All(ref children) if children.len() == 2));
    Ok(())
}

#[test]
fn tolerates_row_metadata_keys() -> Result<()> {
    let mut payload = common::rule(common::leaf("$.GenderId", "equal", json!(1)));
    payload["id"] = json!("1f2a9e4c-7b3d-4c5e-8f6a-0b1c2d3e4f5a");
    payload["createdAt"] = json!("2024-01-05T08:30:00Z");
    payload["updatedAt"] = json!("2024-01-06T08:30:00Z");
    SchemeRule::from_value(&payload)?;

    payload["priority"] = json!(10);
    let err = SchemeRule::from_value(&payload).unwrap_err();
    assert!(matches!(err, RuleError::InvalidPayload(ref detail) if detail.contains("priority")));
    Ok(())
}

#[test]
fn unknown_operators_fail_parsing() {
    let payload = common::rule(common::leaf("$.GenderId", "equals", json!(1)));
    let err = SchemeRule::from_value(&payload).unwrap_err();
    assert!(matches!(err, RuleError::UnsupportedOperator(ref op) if op == "equals"));
}

#[test]
fn empty_combinators_fail_parsing() {
    for combinator in ["all", "any"] {
        let payload = common::rule(json!({ combinator: [] }));
        let err = SchemeRule::from_value(&payload).unwrap_err();
        assert!(
            matches!(err, RuleError::EmptyCombinator(name) if name == combinator),
            "expected EmptyCombinator for {:?}",
            combinator
        );
    }
}

#[test]
fn a_node_cannot_mix_combinators_or_carry_extras() {
    let both = common::rule(json!({
        "all": [common::leaf("$.GenderId", "equal", json!(1))],
        "any": [common::leaf("$.GenderId", "equal", json!(2))],
    }));
    assert!(matches!(
        SchemeRule::from_value(&both).unwrap_err(),
        RuleError::InvalidPayload(_)
    ));

    let extras = common::rule(json!({
        "all": [common::leaf("$.GenderId", "equal", json!(1))],
        "priority": 1,
    }));
    assert!(matches!(
        SchemeRule::from_value(&extras).unwrap_err(),
        RuleError::InvalidPayload(_)
    ));
}

#[test]
fn leaves_require_fact_path_operator_and_value() {
    let no_path = common::rule(json!({
        "fact": "applicant-details",
        "operator": "equal",
        "value": 1
    }));
    assert!(matches!(
        SchemeRule::from_value(&no_path).unwrap_err(),
        RuleError::InvalidPayload(_)
    ));

    let bad_path = common::rule(common::leaf("GenderId", "equal", json!(1)));
    assert!(matches!(
        SchemeRule::from_value(&bad_path).unwrap_err(),
        RuleError::InvalidPath(_)
    ));

    let no_value = common::rule(json!({
        "fact": "applicant-details",
        "operator": "equal",
        "path": "$.GenderId"
    }));
    assert!(matches!(
        SchemeRule::from_value(&no_value).unwrap_err(),
        RuleError::InvalidPayload(_)
    ));

    let unknown_key = common::rule(json!({
        "fact": "applicant-details",
        "operator": "equal",
        "path": "$.GenderId",
        "value": 1,
        "weight": 2
    }));
    assert!(matches!(
        SchemeRule::from_value(&unknown_key).unwrap_err(),
        RuleError::InvalidPayload(_)
    ));
}

#[test]
fn membership_operands_are_checked_at_parse_time() {
    let payload = common::rule(common::leaf("$.EmploymentStatusId", "in", json!(2)));
    let err = SchemeRule::from_value(&payload).unwrap_err();
    assert!(matches!(err, RuleError::InvalidOperand { operator: "in", .. }));
}

#[test]
fn events_require_a_message_and_reject_unknown_fields() {
    let mut no_event = common::rule(common::leaf("$.GenderId", "equal", json!(1)));
    no_event.as_object_mut().unwrap().remove("event");
    assert!(matches!(
        SchemeRule::from_value(&no_event).unwrap_err(),
        RuleError::InvalidPayload(ref detail) if detail.contains("event")
    ));

    let mut no_message = common::rule(common::leaf("$.GenderId", "equal", json!(1)));
    no_message["event"] = json!({"type": "eligible", "params": {}});
    assert!(matches!(
        SchemeRule::from_value(&no_message).unwrap_err(),
        RuleError::InvalidPayload(_)
    ));

    let mut stray_field = common::rule(common::leaf("$.GenderId", "equal", json!(1)));
    stray_field["event"] = json!({
        "type": "eligible",
        "params": {"message": "ok"},
        "severity": "high"
    });
    assert!(matches!(
        SchemeRule::from_value(&stray_field).unwrap_err(),
        RuleError::InvalidPayload(_)
    ));

    // Extra keys inside params are payload data and survive parsing.
    let mut extra_params = common::rule(common::leaf("$.GenderId", "equal", json!(1)));
    extra_params["event"] = json!({
        "type": "eligible",
        "params": {"message": "ok", "benefitAmount": 500}
    });
    let rule = SchemeRule::from_value(&extra_params).expect("extra params are allowed");
    assert_eq!(rule.event.params.extra.get("benefitAmount"), Some(&json!(500)));
}

#[test]
fn deep_nesting_is_bounded() {
    let mut conditions = common::leaf("$.GenderId", "equal", json!(1));
    for _ in 0..40 {
        conditions = json!({ "all": [conditions] });
    }

    let err = SchemeRule::from_value(&common::rule(conditions)).unwrap_err();
    assert!(matches!(err, RuleError::DepthExceeded { .. }));
}

#[tokio::test]
async fn loading_skips_undeclared_rules_and_reports_malformed_ones() -> Result<()> {
    let stores = Stores::memory();
    let valid = common::rule(common::leaf("$.GenderId", "equal", json!(1)));

    let declared = common::insert_scheme(&stores, "Scheme With Rule", Some(&valid)).await?;
    common::insert_scheme(&stores, "Scheme Without Rule", None).await?;
    let broken = insert_raw_scheme(&stores, "Scheme With Broken Rule", "not json").await?;
    insert_raw_scheme(&stores, "Scheme With Blank Rule", "   ").await?;

    let bundles = stores.schemes.find_all().await?;
    let ruleset = load_rules(&bundles, InvalidRulePolicy::Skip)?;

    assert_eq!(ruleset.loaded.len(), 1);
    assert_eq!(ruleset.loaded[0].scheme_id, declared.id);
    assert_eq!(ruleset.loaded[0].scheme_index, 0);

    assert_eq!(ruleset.issues.len(), 1);
    assert_eq!(ruleset.issues[0].scheme_id, broken.id);
    assert_eq!(ruleset.issues[0].scheme_name, "Scheme With Broken Rule");
    Ok(())
}

#[tokio::test]
async fn strict_policy_aborts_on_the_offending_scheme() -> Result<()> {
    let stores = Stores::memory();
    let valid = common::rule(common::leaf("$.GenderId", "equal", json!(1)));

    common::insert_scheme(&stores, "Scheme With Rule", Some(&valid)).await?;
    let broken =
        insert_raw_scheme(&stores, "Scheme With Broken Rule", "{\"conditions\": 1}").await?;

    let bundles = stores.schemes.find_all().await?;
    let err = load_rules(&bundles, InvalidRulePolicy::Fail).unwrap_err();
    match err {
        RuleError::Scheme { scheme_id, .. } => assert_eq!(scheme_id, broken.id),
        other => panic!("expected scheme-tagged error, got: {:?}", other),
    }
    Ok(())
}
