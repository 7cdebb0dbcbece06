//! Welfare scheme eligibility matching, document validation and
//! rejection-risk scoring, plus the tracker that ties them to registered
//! applicants.

pub mod analyzer;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod profile;
pub mod risk;
pub mod telemetry;
pub mod tracker;
