use serde::Serialize;

use crate::analyzer::domain::{DocumentRecord, ValidationStatus};
use crate::profile::{UserProfile, REQUIRED_PROFILE_FIELDS};

/// Documents an application is assumed to need, independent of the scheme.
pub const EXPECTED_DOCUMENTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskFactor {
    ProfileCompleteness,
    DocumentCompleteness,
    DocumentValidity,
    IncomeVerification,
    AgeVerification,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 5] = [
        RiskFactor::ProfileCompleteness,
        RiskFactor::DocumentCompleteness,
        RiskFactor::DocumentValidity,
        RiskFactor::IncomeVerification,
        RiskFactor::AgeVerification,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RiskFactor::ProfileCompleteness => "Profile Completeness",
            RiskFactor::DocumentCompleteness => "Document Completeness",
            RiskFactor::DocumentValidity => "Document Validity",
            RiskFactor::IncomeVerification => "Income Verification",
            RiskFactor::AgeVerification => "Age Verification",
        }
    }
}

/// Raw 0-100 sub-scores, higher meaning riskier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub profile_completeness: f64,
    pub document_completeness: f64,
    pub document_validity: f64,
    pub income_verification: f64,
    pub age_verification: f64,
}

impl FactorScores {
    pub fn compute(profile: &UserProfile, documents: &[DocumentRecord]) -> Self {
        Self {
            profile_completeness: profile_completeness(profile),
            document_completeness: document_completeness(documents.len()),
            document_validity: document_validity(documents),
            income_verification: income_risk(profile.income),
            age_verification: age_risk(profile.age),
        }
    }

    pub fn get(&self, factor: RiskFactor) -> f64 {
        match factor {
            RiskFactor::ProfileCompleteness => self.profile_completeness,
            RiskFactor::DocumentCompleteness => self.document_completeness,
            RiskFactor::DocumentValidity => self.document_validity,
            RiskFactor::IncomeVerification => self.income_verification,
            RiskFactor::AgeVerification => self.age_verification,
        }
    }
}

pub fn profile_completeness(profile: &UserProfile) -> f64 {
    let filled = profile.filled_required_fields() as f64;
    100.0 - filled / REQUIRED_PROFILE_FIELDS as f64 * 100.0
}

pub fn document_completeness(uploaded: usize) -> f64 {
    let completeness = (uploaded as f64 / EXPECTED_DOCUMENTS as f64 * 100.0).min(100.0);
    100.0 - completeness
}

pub fn document_validity(documents: &[DocumentRecord]) -> f64 {
    if documents.is_empty() {
        return 100.0;
    }
    let valid = documents
        .iter()
        .filter(|doc| doc.validation_status == ValidationStatus::Valid)
        .count();
    100.0 - valid as f64 / documents.len() as f64 * 100.0
}

/// Unknown income falls through to the lowest band.
pub fn income_risk(income: Option<f64>) -> f64 {
    match income {
        Some(income) if income < 50_000.0 => 70.0,
        Some(income) if income < 100_000.0 => 50.0,
        Some(income) if income < 200_000.0 => 30.0,
        Some(income) if income < 500_000.0 => 20.0,
        _ => 10.0,
    }
}

pub fn age_risk(age: Option<u32>) -> f64 {
    match age {
        Some(age) if !(18..=70).contains(&age) => 60.0,
        Some(age) if !(25..=60).contains(&age) => 30.0,
        _ => 10.0,
    }
}
