use chrono::NaiveDate;
use serde::Serialize;

/// Documents expiring within this many days (inclusive) are flagged.
pub const EXPIRING_SOON_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Valid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryCheck {
    pub is_expired: bool,
    pub expiring_soon: bool,
    pub days_until_expiry: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExpiryStatus>,
}

/// Classify an optional expiry date relative to `today`. A missing date is a
/// neutral result, never an error.
pub fn expiry_check(expiry: Option<NaiveDate>, today: NaiveDate) -> ExpiryCheck {
    let Some(expiry) = expiry else {
        return ExpiryCheck {
            is_expired: false,
            expiring_soon: false,
            days_until_expiry: None,
            expiry_date: None,
            message: "No expiry date provided".to_string(),
            status: None,
        };
    };

    let days = days_until(expiry, today);
    let is_expired = days < 0;
    let expiring_soon = (0..=EXPIRING_SOON_DAYS).contains(&days);

    let (message, status) = if is_expired {
        (
            format!("Document expired {} days ago", days.abs()),
            ExpiryStatus::Expired,
        )
    } else if expiring_soon {
        (
            format!("Document expires in {days} days"),
            ExpiryStatus::ExpiringSoon,
        )
    } else {
        (
            format!("Document valid for {days} days"),
            ExpiryStatus::Valid,
        )
    };

    ExpiryCheck {
        is_expired,
        expiring_soon,
        days_until_expiry: Some(days),
        expiry_date: Some(expiry),
        message,
        status: Some(status),
    }
}

/// Both dates sit at midnight; the millisecond delta is ceiling-divided so a
/// partial day never reads as negative.
fn days_until(expiry: NaiveDate, today: NaiveDate) -> i64 {
    let millis = expiry.signed_duration_since(today).num_milliseconds();
    -(-millis).div_euclid(MILLIS_PER_DAY)
}
