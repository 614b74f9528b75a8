pub mod condition;
pub mod engine;
pub mod error;
pub mod facts;
pub mod loader;
pub mod types;

pub use condition::{apply_operator, evaluate, values_equal};
pub use engine::{run_rules, RuleOutcome};
pub use error::RuleError;
pub use facts::{FactProvider, FactSource, StaticFact};
pub use loader::{load_rules, LoadedRule, RuleIssue, RuleSet};
pub use types::*;
