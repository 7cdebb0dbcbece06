use serde::Serialize;

use super::domain::{SchemeRule, ALL};
use crate::profile::UserProfile;

/// Minimum match percentage for a profile to count as eligible.
pub const ELIGIBILITY_THRESHOLD: u8 = 70;

const NOT_PROVIDED: &str = "not provided";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub is_eligible: bool,
    pub match_percentage: u8,
    pub matched_criteria: Vec<String>,
    pub unmatched_criteria: Vec<String>,
    pub total_criteria: usize,
    pub matched_count: usize,
}

#[derive(Default)]
struct Tally {
    total: usize,
    matched: Vec<String>,
    unmatched: Vec<String>,
}

impl Tally {
    fn record(&mut self, satisfied: bool, matched: String, unmatched: impl FnOnce() -> String) {
        self.total += 1;
        if satisfied {
            self.matched.push(matched);
        } else {
            self.unmatched.push(unmatched());
        }
    }
}

/// Score `profile` against `rule`, counting only the criteria the rule sets.
pub fn evaluate_eligibility(profile: &UserProfile, rule: &SchemeRule) -> EligibilityResult {
    let mut tally = Tally::default();

    if let Some(bounds) = rule.age {
        let constraint = format!("Age: {}-{} years", bounds.min, bounds.max);
        let satisfied = profile.age.is_some_and(|age| bounds.contains(&age));
        tally.record(satisfied, constraint.clone(), || {
            let yours = profile
                .age
                .map_or_else(|| NOT_PROVIDED.to_string(), |age| age.to_string());
            format!("{constraint} (You: {yours})")
        });
    }

    if let Some(bounds) = rule.income {
        let constraint = format!(
            "Income: ₹{}-₹{}",
            format_amount(bounds.min),
            format_amount(bounds.max)
        );
        let satisfied = profile.income.is_some_and(|income| bounds.contains(&income));
        tally.record(satisfied, constraint.clone(), || {
            let yours = profile.income.map_or_else(
                || NOT_PROVIDED.to_string(),
                |income| format!("₹{}", format_amount(income)),
            );
            format!("{constraint} (You: {yours})")
        });
    }

    if !rule.states.is_empty() {
        let state = profile.state.as_deref();
        let satisfied = rule
            .states
            .iter()
            .any(|allowed| allowed == ALL || Some(allowed.as_str()) == state);
        let listed = rule.states.join(", ");
        tally.record(
            satisfied,
            format!("State: {}", state.unwrap_or(listed.as_str())),
            || format!("State: {listed} (You: {})", state.unwrap_or(NOT_PROVIDED)),
        );
    }

    if let (Some(wanted), Some(gender)) = (rule.gender, profile.gender) {
        tally.record(wanted.admits(&gender), format!("Gender: {wanted}"), || {
            format!("Gender: {wanted} (You: {})", gender.label())
        });
    }

    if let (Some(wanted), Some(category)) = (rule.category.as_deref(), profile.category) {
        let satisfied = wanted.iter().any(|audience| audience.admits(&category));
        tally.record(
            satisfied,
            format!("Category: {}", category.label()),
            || {
                let listed: Vec<String> = wanted.iter().map(|audience| audience.to_string()).collect();
                format!("Category: {} (You: {})", listed.join(", "), category.label())
            },
        );
    }

    let matched_count = tally.matched.len();
    let match_percentage = if tally.total == 0 {
        0
    } else {
        (matched_count as f64 / tally.total as f64 * 100.0).round() as u8
    };

    EligibilityResult {
        is_eligible: match_percentage >= ELIGIBILITY_THRESHOLD,
        match_percentage,
        matched_criteria: tally.matched,
        unmatched_criteria: tally.unmatched,
        total_criteria: tally.total,
        matched_count,
    }
}

/// Comma-grouped amount, e.g. `200,000` or `1,250.5`.
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let whole = rounded.abs().trunc() as u64;
    let fraction = rounded.abs().fract();

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if fraction > 0.0 {
        let decimals = format!("{fraction:.3}");
        let decimals = decimals.trim_start_matches('0').trim_end_matches('0');
        grouped.push_str(decimals);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}
