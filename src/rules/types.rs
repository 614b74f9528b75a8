use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::RuleError;
use crate::config::config;

/// Comparison operators accepted in stored rule payloads.
///
/// Wire names follow the platform's rule vocabulary; anything else fails
/// parsing rather than evaluating to false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOp {
    #[serde(rename = "equal")]
    Equal,
    #[serde(rename = "notEqual")]
    NotEqual,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "notIn")]
    NotIn,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "doesNotContain")]
    DoesNotContain,
    #[serde(rename = "lessThan")]
    LessThan,
    #[serde(rename = "lessThanInclusive")]
    LessThanInclusive,
    #[serde(rename = "greaterThan")]
    GreaterThan,
    #[serde(rename = "greaterThanInclusive")]
    GreaterThanInclusive,
}

impl ConditionOp {
    pub fn parse(op: &str) -> Result<Self, RuleError> {
        Ok(match op {
            "equal" => ConditionOp::Equal,
            "notEqual" => ConditionOp::NotEqual,
            "in" => ConditionOp::In,
            "notIn" => ConditionOp::NotIn,
            "contains" => ConditionOp::Contains,
            "doesNotContain" => ConditionOp::DoesNotContain,
            "lessThan" => ConditionOp::LessThan,
            "lessThanInclusive" => ConditionOp::LessThanInclusive,
            "greaterThan" => ConditionOp::GreaterThan,
            "greaterThanInclusive" => ConditionOp::GreaterThanInclusive,
            other => return Err(RuleError::UnsupportedOperator(other.to_string())),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOp::Equal => "equal",
            ConditionOp::NotEqual => "notEqual",
            ConditionOp::In => "in",
            ConditionOp::NotIn => "notIn",
            ConditionOp::Contains => "contains",
            ConditionOp::DoesNotContain => "doesNotContain",
            ConditionOp::LessThan => "lessThan",
            ConditionOp::LessThanInclusive => "lessThanInclusive",
            ConditionOp::GreaterThan => "greaterThan",
            ConditionOp::GreaterThanInclusive => "greaterThanInclusive",
        }
    }

    /// Structural operand checks applied at parse time, so broken payloads
    /// surface when a rule is written rather than when it first runs.
    pub fn validate_operand(&self, operand: &Value) -> Result<(), RuleError> {
        match self {
            ConditionOp::In | ConditionOp::NotIn if !operand.is_array() => {
                Err(RuleError::InvalidOperand {
                    operator: self.as_str(),
                    detail: "operand must be an array".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// `$`-rooted accessor into a fact's attribute structure,
/// e.g. `$.GenderId` or `$.addresses[0].postal_code`.
#[derive(Debug, Clone, PartialEq)]
pub struct FactPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FactPath {
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        let rest = raw
            .strip_prefix('$')
            .ok_or_else(|| RuleError::InvalidPath(format!("'{}' must start with '$'", raw)))?;

        let mut segments = Vec::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    let mut key = String::new();
                    while let Some(&next) = chars.peek() {
                        if next == '.' || next == '[' {
                            break;
                        }
                        key.push(next);
                        chars.next();
                    }
                    if key.is_empty() {
                        return Err(RuleError::InvalidPath(format!("'{}' has an empty segment", raw)));
                    }
                    segments.push(PathSegment::Key(key));
                }
                '[' => {
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) if d.is_ascii_digit() => digits.push(d),
                            _ => {
                                return Err(RuleError::InvalidPath(format!(
                                    "'{}' has a malformed index",
                                    raw
                                )))
                            }
                        }
                    }
                    let index = digits.parse().map_err(|_| {
                        RuleError::InvalidPath(format!("'{}' has a malformed index", raw))
                    })?;
                    segments.push(PathSegment::Index(index));
                }
                _ => {
                    return Err(RuleError::InvalidPath(format!(
                        "unexpected character '{}' in '{}'",
                        c, raw
                    )))
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Walk the path into `root`. Any missing segment yields `None`;
    /// callers treat that as a JSON null, not an error.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                PathSegment::Key(key) => current.get(key.as_str())?,
                PathSegment::Index(index) => current.get(*index)?,
            };
        }
        Some(current)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Leaf condition: compare one fact attribute against a literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub fact: String,
    pub path: FactPath,
    pub operator: ConditionOp,
    pub value: Value,
}

/// Boolean condition tree stored with a scheme.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    All(Vec<ConditionNode>),
    Any(Vec<ConditionNode>),
    Leaf(Comparison),
}

impl ConditionNode {
    pub fn from_value(value: &Value) -> Result<Self, RuleError> {
        let max = config().eligibility.max_condition_depth;
        Self::parse_node(value, 1, max)
    }

    fn parse_node(value: &Value, depth: u32, max: u32) -> Result<Self, RuleError> {
        if depth > max {
            return Err(RuleError::DepthExceeded { depth, max });
        }

        let obj = value
            .as_object()
            .ok_or_else(|| RuleError::InvalidPayload("condition must be a JSON object".to_string()))?;

        let has_all = obj.contains_key("all");
        let has_any = obj.contains_key("any");
        match (has_all, has_any) {
            (true, true) => Err(RuleError::InvalidPayload(
                "condition cannot combine 'all' and 'any'".to_string(),
            )),
            (true, false) => {
                Self::reject_extra_keys(obj, "all")?;
                Self::parse_combinator("all", &obj["all"], depth, max).map(ConditionNode::All)
            }
            (false, true) => {
                Self::reject_extra_keys(obj, "any")?;
                Self::parse_combinator("any", &obj["any"], depth, max).map(ConditionNode::Any)
            }
            (false, false) => Self::parse_leaf(obj).map(ConditionNode::Leaf),
        }
    }

    fn reject_extra_keys(obj: &Map<String, Value>, combinator: &'static str) -> Result<(), RuleError> {
        if obj.len() > 1 {
            return Err(RuleError::InvalidPayload(format!(
                "unexpected keys alongside '{}'",
                combinator
            )));
        }
        Ok(())
    }

    fn parse_combinator(
        name: &'static str,
        value: &Value,
        depth: u32,
        max: u32,
    ) -> Result<Vec<ConditionNode>, RuleError> {
        let items = value
            .as_array()
            .ok_or_else(|| RuleError::InvalidPayload(format!("'{}' must be an array", name)))?;
        if items.is_empty() {
            return Err(RuleError::EmptyCombinator(name));
        }
        items
            .iter()
            .map(|item| Self::parse_node(item, depth + 1, max))
            .collect()
    }

    fn parse_leaf(obj: &Map<String, Value>) -> Result<Comparison, RuleError> {
        for key in obj.keys() {
            if !matches!(key.as_str(), "fact" | "operator" | "value" | "path") {
                return Err(RuleError::InvalidPayload(format!(
                    "unknown condition key '{}'",
                    key
                )));
            }
        }

        let fact = obj
            .get("fact")
            .and_then(Value::as_str)
            .ok_or_else(|| RuleError::InvalidPayload("condition requires a string 'fact'".to_string()))?;
        let operator_name = obj
            .get("operator")
            .and_then(Value::as_str)
            .ok_or_else(|| RuleError::InvalidPayload("condition requires a string 'operator'".to_string()))?;
        let operator = ConditionOp::parse(operator_name)?;
        let raw_path = obj
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| RuleError::InvalidPayload("condition requires a string 'path'".to_string()))?;
        let path = FactPath::parse(raw_path)?;
        let value = obj
            .get("value")
            .ok_or_else(|| RuleError::InvalidPayload("condition requires a 'value'".to_string()))?
            .clone();
        operator.validate_operand(&value)?;

        Ok(Comparison {
            fact: fact.to_string(),
            path,
            operator,
            value,
        })
    }
}

/// Descriptor attached to a rule, surfaced when the rule passes.
/// Not consumed by evaluation itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub params: EventParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParams {
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed form of one scheme's stored rule payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeRule {
    pub name: Option<String>,
    pub conditions: ConditionNode,
    pub event: RuleEvent,
}

impl SchemeRule {
    pub fn parse(payload: &str) -> Result<Self, RuleError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, RuleError> {
        let obj = value
            .as_object()
            .ok_or_else(|| RuleError::InvalidPayload("rule payload must be a JSON object".to_string()))?;

        for key in obj.keys() {
            match key.as_str() {
                "name" | "conditions" | "event" => {}
                // Row metadata that round-trips through API clients.
                "id" | "createdAt" | "updatedAt" => {}
                other => {
                    return Err(RuleError::InvalidPayload(format!("unknown rule key '{}'", other)))
                }
            }
        }

        let name = match obj.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(RuleError::InvalidPayload("'name' must be a string".to_string())),
        };

        let conditions_value = obj
            .get("conditions")
            .ok_or_else(|| RuleError::InvalidPayload("'conditions' is required".to_string()))?;
        let conditions = ConditionNode::from_value(conditions_value)?;

        let event_value = obj
            .get("event")
            .ok_or_else(|| RuleError::InvalidPayload("'event' is required".to_string()))?;
        let event: RuleEvent = serde_json::from_value(event_value.clone())
            .map_err(|e| RuleError::InvalidPayload(format!("invalid event: {}", e)))?;

        Ok(Self {
            name,
            conditions,
            event,
        })
    }

    /// Display label for logs and outcome listings.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed-rule")
    }
}
