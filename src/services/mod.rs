pub mod eligibility;
pub mod scheme_rules;

pub use eligibility::{EligibilityError, EligibilityReport, EligibilityService, APPLICANT_FACT};
pub use scheme_rules::{SchemeRuleError, SchemeRuleService};
