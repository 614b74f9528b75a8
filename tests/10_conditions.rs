use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fasms_eligibility::rules::{
    apply_operator, evaluate, values_equal, ConditionNode, ConditionOp, FactPath, FactProvider,
    FactSource, RuleError,
};

// These tests pin the comparison semantics stored rules rely on: comparisons
// are type-sensitive, missing data compares as null, and configuration
// problems (unknown facts, bad operands) are errors rather than `false`.

fn leaf(fact: &str, path: &str, operator: &str, value: Value) -> Value {
    json!({
        "fact": fact,
        "operator": operator,
        "path": path,
        "value": value
    })
}

fn node(value: Value) -> ConditionNode {
    ConditionNode::from_value(&value).expect("condition should parse")
}

#[test]
fn equality_is_type_sensitive() -> Result<()> {
    assert!(apply_operator(ConditionOp::Equal, &json!("a"), &json!("a"))?);
    assert!(!apply_operator(ConditionOp::Equal, &json!("1"), &json!(1))?);
    assert!(!apply_operator(ConditionOp::Equal, &json!(true), &json!(1))?);
    assert!(apply_operator(ConditionOp::NotEqual, &json!("1"), &json!(1))?);
    assert!(apply_operator(ConditionOp::Equal, &Value::Null, &Value::Null)?);
    Ok(())
}

#[test]
fn numbers_compare_across_integer_and_float_representations() {
    assert!(values_equal(&json!(1), &json!(1.0)));
    assert!(values_equal(&json!(0), &json!(-0.0)));
    assert!(!values_equal(&json!(1), &json!(1.5)));
    // Nested values compare element-wise, so representation differences
    // inside arrays and objects do not matter either.
    assert!(values_equal(&json!([1, 2]), &json!([1.0, 2.0])));
    assert!(values_equal(&json!({"a": 1}), &json!({"a": 1.0})));
    assert!(!values_equal(&json!([1, 2]), &json!([1])));
}

#[test]
fn membership_requires_an_array_operand() -> Result<()> {
    assert!(apply_operator(ConditionOp::In, &json!(2), &json!([2, 3]))?);
    assert!(!apply_operator(ConditionOp::In, &json!(5), &json!([2, 3]))?);
    assert!(apply_operator(ConditionOp::NotIn, &json!(5), &json!([2, 3]))?);

    let err = apply_operator(ConditionOp::In, &json!(2), &json!(2)).unwrap_err();
    assert!(matches!(err, RuleError::InvalidOperand { operator: "in", .. }));
    let err = apply_operator(ConditionOp::NotIn, &json!(2), &json!("2,3")).unwrap_err();
    assert!(matches!(err, RuleError::InvalidOperand { operator: "notIn", .. }));
    Ok(())
}

#[test]
fn containment_requires_an_array_fact_value() -> Result<()> {
    let tags = json!(["priority", "review"]);
    assert!(apply_operator(ConditionOp::Contains, &tags, &json!("priority"))?);
    assert!(!apply_operator(ConditionOp::Contains, &tags, &json!("closed"))?);
    assert!(apply_operator(ConditionOp::DoesNotContain, &tags, &json!("closed"))?);

    // A non-array fact value fails the check in both polarities.
    assert!(!apply_operator(ConditionOp::Contains, &json!("priority"), &json!("priority"))?);
    assert!(!apply_operator(ConditionOp::DoesNotContain, &json!("priority"), &json!("closed"))?);
    Ok(())
}

#[test]
fn ordering_applies_to_numbers_only() -> Result<()> {
    assert!(apply_operator(ConditionOp::LessThan, &json!(1), &json!(2))?);
    assert!(!apply_operator(ConditionOp::LessThan, &json!(2), &json!(2))?);
    assert!(apply_operator(ConditionOp::LessThanInclusive, &json!(2), &json!(2))?);
    assert!(apply_operator(ConditionOp::GreaterThan, &json!(2.5), &json!(2))?);
    assert!(apply_operator(ConditionOp::GreaterThanInclusive, &json!(2), &json!(2))?);

    // Strings are never ordered, so every ordering operator is false.
    assert!(!apply_operator(ConditionOp::LessThan, &json!("1"), &json!("2"))?);
    assert!(!apply_operator(ConditionOp::GreaterThan, &json!("2"), &json!("1"))?);
    assert!(!apply_operator(ConditionOp::GreaterThanInclusive, &json!("2"), &json!("2"))?);
    Ok(())
}

#[test]
fn paths_walk_into_nested_structures() -> Result<()> {
    let fact = json!({
        "GenderId": 1,
        "addresses": [{"postal_code": "520123"}]
    });

    let path = FactPath::parse("$.addresses[0].postal_code")?;
    assert_eq!(path.resolve(&fact), Some(&json!("520123")));

    // `$` alone addresses the whole fact value.
    let root = FactPath::parse("$")?;
    assert_eq!(root.resolve(&fact), Some(&fact));

    // Walking off the structure is None, which evaluation treats as null.
    assert_eq!(FactPath::parse("$.missing")?.resolve(&fact), None);
    assert_eq!(FactPath::parse("$.addresses[9]")?.resolve(&fact), None);
    Ok(())
}

#[test]
fn malformed_paths_fail_parsing() {
    for raw in ["GenderId", ".GenderId", "$.", "$.a..b", "$.xs[abc]", "$.xs[0", "$x"] {
        let err = FactPath::parse(raw).unwrap_err();
        assert!(
            matches!(err, RuleError::InvalidPath(_)),
            "expected InvalidPath for {:?}, got: {:?}",
            raw,
            err
        );
    }
}

#[tokio::test]
async fn missing_attributes_compare_as_null() -> Result<()> {
    let mut facts = FactProvider::new();
    facts.register_value("applicant-details", json!({"GenderId": 1}));

    let matches_null = node(leaf("applicant-details", "$.HouseholdId", "equal", Value::Null));
    assert!(evaluate(&matches_null, &facts).await?);

    let not_equal = node(leaf("applicant-details", "$.HouseholdId", "notEqual", Value::Null));
    assert!(!evaluate(&not_equal, &facts).await?);
    Ok(())
}

#[tokio::test]
async fn combinators_short_circuit_left_to_right() -> Result<()> {
    let mut facts = FactProvider::new();
    facts.register_value("applicant-details", json!({"GenderId": 1}));

    // The second leaf references an unregistered fact. It only errors when
    // evaluation actually reaches it.
    let broken = leaf("household-income", "$.total", "lessThan", json!(2000));

    let all = node(json!({
        "all": [leaf("applicant-details", "$.GenderId", "equal", json!(2)), broken.clone()]
    }));
    assert!(!evaluate(&all, &facts).await?);

    let any = node(json!({
        "any": [leaf("applicant-details", "$.GenderId", "equal", json!(1)), broken.clone()]
    }));
    assert!(evaluate(&any, &facts).await?);

    let any_second = node(json!({
        "any": [
            leaf("applicant-details", "$.GenderId", "equal", json!(2)),
            leaf("applicant-details", "$.GenderId", "equal", json!(1)),
        ]
    }));
    assert!(evaluate(&any_second, &facts).await?, "a later matching leaf satisfies any");

    let reached = node(json!({
        "all": [leaf("applicant-details", "$.GenderId", "equal", json!(1)), broken]
    }));
    let err = evaluate(&reached, &facts).await.unwrap_err();
    assert!(matches!(err, RuleError::UnknownFact(name) if name == "household-income"));
    Ok(())
}

struct CountingFact {
    value: Value,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl FactSource for CountingFact {
    async fn resolve(&self) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

#[tokio::test]
async fn facts_resolve_at_most_once_per_provider() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut facts = FactProvider::new();
    facts.register(
        "applicant-details",
        Arc::new(CountingFact {
            value: json!({"GenderId": 1, "EmploymentStatusId": 2, "MaritalStatusId": 1}),
            calls: calls.clone(),
        }),
    );

    let tree = node(json!({
        "all": [
            leaf("applicant-details", "$.GenderId", "equal", json!(1)),
            leaf("applicant-details", "$.EmploymentStatusId", "in", json!([2, 3])),
            leaf("applicant-details", "$.MaritalStatusId", "equal", json!(1)),
        ]
    }));

    assert!(evaluate(&tree, &facts).await?);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "three references, one resolution");

    // The cache lives on the provider, so another run with it stays memoized.
    assert!(evaluate(&tree, &facts).await?);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

struct FailingFact;

#[async_trait]
impl FactSource for FailingFact {
    async fn resolve(&self) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err("lookup store unavailable".into())
    }
}

#[tokio::test]
async fn fact_resolution_failures_are_errors() -> Result<()> {
    let mut facts = FactProvider::new();
    facts.register("applicant-details", Arc::new(FailingFact));

    let tree = node(leaf("applicant-details", "$.GenderId", "equal", json!(1)));
    let err = evaluate(&tree, &facts).await.unwrap_err();
    match err {
        RuleError::FactResolution { fact, detail } => {
            assert_eq!(fact, "applicant-details");
            assert!(detail.contains("unavailable"), "unexpected detail: {}", detail);
        }
        other => panic!("expected FactResolution, got: {:?}", other),
    }
    Ok(())
}
