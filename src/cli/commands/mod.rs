pub mod applicant;
pub mod db;
pub mod eligibility;
pub mod scheme;
pub mod seed;
