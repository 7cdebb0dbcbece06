use chrono::{DateTime, Utc};
use serde::Serialize;

use super::factors::FactorScores;
use crate::analyzer::domain::DocumentRecord;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
const RENEWAL_WINDOW_DAYS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
    pub action: String,
}

impl Recommendation {
    fn new(priority: Priority, message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            priority,
            message: message.into(),
            action: action.into(),
        }
    }
}

/// Independent threshold checks over the sub-scores plus a renewal scan.
/// Never returns an empty list.
pub fn recommendations(
    scores: &FactorScores,
    documents: &[DocumentRecord],
    now: DateTime<Utc>,
) -> Vec<Recommendation> {
    let mut advice = Vec::new();

    if scores.profile_completeness > 20.0 {
        advice.push(Recommendation::new(
            Priority::High,
            "Complete all profile fields to reduce rejection risk",
            "Update your profile with missing information",
        ));
    }

    if scores.document_completeness > 40.0 {
        advice.push(Recommendation::new(
            Priority::High,
            "Upload all required documents",
            "Add missing documents to strengthen your application",
        ));
    }

    if scores.document_validity > 30.0 {
        advice.push(Recommendation::new(
            Priority::Critical,
            "Fix document validation errors",
            "Review and re-upload documents with issues",
        ));
    }

    let expiring = documents
        .iter()
        .filter(|doc| {
            doc.expiry_date.is_some_and(|expiry| {
                let days = fractional_days_until(expiry, now);
                days > 0.0 && days < RENEWAL_WINDOW_DAYS
            })
        })
        .count();
    if expiring > 0 {
        advice.push(Recommendation::new(
            Priority::Medium,
            format!("{expiring} document(s) expiring soon"),
            "Renew documents before they expire",
        ));
    }

    if advice.is_empty() {
        advice.push(Recommendation::new(
            Priority::Low,
            "Your application looks strong!",
            "Proceed with confidence",
        ));
    }

    advice
}

/// Plain subtraction against the current instant, unlike the whole-day math
/// of the expiry checker. Expiry dates are read as UTC midnight.
fn fractional_days_until(expiry: chrono::NaiveDate, now: DateTime<Utc>) -> f64 {
    let midnight = expiry.and_time(chrono::NaiveTime::MIN).and_utc();
    midnight.signed_duration_since(now).num_milliseconds() as f64 / MILLIS_PER_DAY
}
