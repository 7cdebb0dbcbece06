//! Rule-based scheme eligibility and the scheme catalog.

pub mod catalog;
pub mod domain;
pub mod rules;

pub use catalog::{SchemeCatalog, SchemeMatch};
pub use domain::{Audience, Bounds, Scheme, SchemeCategory, SchemeRule};
pub use rules::{evaluate_eligibility, EligibilityResult, ELIGIBILITY_THRESHOLD};
