pub mod applicant;
pub mod application;
pub mod benefit;
pub mod household;
pub mod scheme;

pub use applicant::{Applicant, NewApplicant};
pub use application::{Application, NewApplication};
pub use benefit::{Benefit, NewBenefit};
pub use household::Household;
pub use scheme::{NewScheme, Scheme, SchemeBundle};
