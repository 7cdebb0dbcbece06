//! Rejection-risk scoring for scheme applications.

pub mod factors;
pub mod model;
pub mod policy;
pub mod recommendations;

pub use factors::{FactorScores, RiskFactor};
pub use model::{
    calculate_risk_score, BreakdownEntry, FactorStatus, FactorWeight, LevelBand, RiskLevel,
    RiskModel, RiskResult,
};
pub use policy::{RejectionPatterns, RiskPolicy};
pub use recommendations::{Priority, Recommendation};
