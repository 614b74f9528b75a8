use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid rule payload: {0}")]
    InvalidPayload(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Combinator '{0}' requires a non-empty array of conditions")]
    EmptyCombinator(&'static str),

    #[error("Invalid fact path: {0}")]
    InvalidPath(String),

    #[error("Invalid operand for '{operator}': {detail}")]
    InvalidOperand { operator: &'static str, detail: String },

    #[error("Unknown fact: {0}")]
    UnknownFact(String),

    #[error("Fact '{fact}' failed to resolve: {detail}")]
    FactResolution { fact: String, detail: String },

    #[error("Condition depth {depth} exceeds maximum {max}")]
    DepthExceeded { depth: u32, max: u32 },

    #[error("Scheme {scheme_id}: {source}")]
    Scheme {
        scheme_id: Uuid,
        #[source]
        source: Box<RuleError>,
    },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RuleError {
    /// Tag an error with the scheme it arose from. Already-tagged errors
    /// keep their original scheme.
    pub fn for_scheme(self, scheme_id: Uuid) -> Self {
        match self {
            tagged @ RuleError::Scheme { .. } => tagged,
            other => RuleError::Scheme {
                scheme_id,
                source: Box::new(other),
            },
        }
    }
}
