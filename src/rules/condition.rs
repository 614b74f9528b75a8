use futures::future::BoxFuture;
use serde_json::{Number, Value};
use std::cmp::Ordering;

use super::error::RuleError;
use super::facts::FactProvider;
use super::types::{Comparison, ConditionNode, ConditionOp};

/// Evaluate a condition tree against the run's facts.
///
/// `all` and `any` short-circuit left to right. Fact lookups go through the
/// provider's per-run cache, so repeated references to one fact cost one
/// resolution.
pub fn evaluate<'a>(
    node: &'a ConditionNode,
    facts: &'a FactProvider,
) -> BoxFuture<'a, Result<bool, RuleError>> {
    Box::pin(async move {
        match node {
            ConditionNode::All(children) => {
                for child in children {
                    if !evaluate(child, facts).await? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ConditionNode::Any(children) => {
                for child in children {
                    if evaluate(child, facts).await? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ConditionNode::Leaf(comparison) => evaluate_leaf(comparison, facts).await,
        }
    })
}

async fn evaluate_leaf(comparison: &Comparison, facts: &FactProvider) -> Result<bool, RuleError> {
    let fact = facts.fact(&comparison.fact).await?;
    // Paths that walk off the attribute structure resolve to null and
    // compare as data. Only unknown facts and operators are errors.
    let actual = comparison.path.resolve(&fact).unwrap_or(&Value::Null);
    apply_operator(comparison.operator, actual, &comparison.value)
}

/// Apply one comparison operator. Comparisons are type-sensitive: values of
/// different JSON types are never equal and never ordered, with the single
/// exception that integer and float representations of the same number
/// compare numerically.
pub fn apply_operator(operator: ConditionOp, actual: &Value, operand: &Value) -> Result<bool, RuleError> {
    match operator {
        ConditionOp::Equal => Ok(values_equal(actual, operand)),
        ConditionOp::NotEqual => Ok(!values_equal(actual, operand)),
        ConditionOp::In => Ok(operand_array(operator, operand)?
            .iter()
            .any(|candidate| values_equal(actual, candidate))),
        ConditionOp::NotIn => Ok(!operand_array(operator, operand)?
            .iter()
            .any(|candidate| values_equal(actual, candidate))),
        // Containment requires an array fact value; anything else fails the
        // check, in both polarities.
        ConditionOp::Contains => Ok(actual
            .as_array()
            .map_or(false, |items| items.iter().any(|item| values_equal(item, operand)))),
        ConditionOp::DoesNotContain => Ok(actual
            .as_array()
            .map_or(false, |items| !items.iter().any(|item| values_equal(item, operand)))),
        ConditionOp::LessThan => Ok(compare_numbers(actual, operand) == Some(Ordering::Less)),
        ConditionOp::LessThanInclusive => Ok(matches!(
            compare_numbers(actual, operand),
            Some(Ordering::Less) | Some(Ordering::Equal)
        )),
        ConditionOp::GreaterThan => Ok(compare_numbers(actual, operand) == Some(Ordering::Greater)),
        ConditionOp::GreaterThanInclusive => Ok(matches!(
            compare_numbers(actual, operand),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        )),
    }
}

fn operand_array(operator: ConditionOp, operand: &Value) -> Result<&Vec<Value>, RuleError> {
    operand.as_array().ok_or_else(|| RuleError::InvalidOperand {
        operator: operator.as_str(),
        detail: "operand must be an array".to_string(),
    })
}

/// Type-sensitive equality. Numbers compare numerically across integer and
/// float representations; everything else compares only within its type.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).map_or(false, |y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Numeric ordering. Non-numbers are unordered, which makes every ordering
/// operator evaluate false rather than coercing strings.
fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        _ => None,
    }
}
