use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::factors::RiskFactor;
use super::model::{FactorWeight, LevelBand, RiskLevel, RiskModel};
use crate::config::{RiskPolicyKind, ScoringConfig};
use crate::error::MalformedInput;

const EMBEDDED_PATTERNS: &str = include_str!("../../data/rejection_patterns.json");

/// Historical rejection reasons with their weights and the three severity
/// bands used to label a score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionPatterns {
    pub common_rejection_reasons: Vec<RejectionReason>,
    pub risk_factors: SeverityBands,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RejectionReason {
    pub reason: String,
    pub weight: f64,
    #[serde(default)]
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeverityBands {
    pub low: SeverityBand,
    pub medium: SeverityBand,
    pub critical: SeverityBand,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeverityBand {
    pub threshold: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Rejection reason each scorable factor corresponds to.
fn reason_for(factor: RiskFactor) -> Option<&'static str> {
    match factor {
        RiskFactor::DocumentCompleteness => Some("Incomplete documentation"),
        RiskFactor::DocumentValidity => Some("Document validation failures"),
        RiskFactor::ProfileCompleteness => Some("Incomplete profile"),
        RiskFactor::IncomeVerification | RiskFactor::AgeVerification => None,
    }
}

impl RejectionPatterns {
    pub fn from_json(raw: &str) -> Result<Self, MalformedInput> {
        let patterns: Self = serde_json::from_str(raw)?;
        let bands = &patterns.risk_factors;
        if !(bands.low.threshold <= bands.medium.threshold
            && bands.medium.threshold <= bands.critical.threshold)
        {
            return Err(MalformedInput::new(
                "rejection pattern thresholds must rise from low to critical",
            ));
        }
        Ok(patterns)
    }

    pub fn embedded() -> Result<Self, MalformedInput> {
        Self::from_json(EMBEDDED_PATTERNS)
    }

    pub fn load(path: &Path) -> Result<Self, MalformedInput> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            MalformedInput::new(format!(
                "failed to read rejection patterns {}: {err}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Reasons without a matching factor are ignored, and factors without a
    /// reason do not contribute.
    pub fn into_model(self) -> Result<RiskModel, MalformedInput> {
        let weights = RiskFactor::ALL
            .into_iter()
            .filter_map(|factor| {
                let reason = reason_for(factor)?;
                let pattern = self
                    .common_rejection_reasons
                    .iter()
                    .find(|pattern| pattern.reason == reason)?;
                Some(FactorWeight {
                    factor,
                    weight: pattern.weight,
                    indicators: pattern.indicators.clone(),
                })
            })
            .collect();

        let SeverityBands {
            low,
            medium,
            critical,
        } = self.risk_factors;
        let band = |level, band: SeverityBand| LevelBand {
            level,
            threshold: band.threshold,
            description: band.description,
        };

        RiskModel::new(
            weights,
            vec![
                band(RiskLevel::Critical, critical),
                band(RiskLevel::Medium, medium),
                band(RiskLevel::Low, low),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiskPolicy {
    Weighted,
    RejectionPatterns(RejectionPatterns),
}

impl RiskPolicy {
    /// Resolve the configured policy, reading a pattern file when one is set.
    pub fn from_config(config: &ScoringConfig) -> Result<Self, MalformedInput> {
        match config.risk_policy {
            RiskPolicyKind::Weighted => Ok(RiskPolicy::Weighted),
            RiskPolicyKind::RejectionPatterns => {
                let patterns = match &config.rejection_patterns {
                    Some(path) => {
                        debug!(path = %path.display(), "loading rejection patterns");
                        RejectionPatterns::load(path)?
                    }
                    None => RejectionPatterns::embedded()?,
                };
                Ok(RiskPolicy::RejectionPatterns(patterns))
            }
        }
    }

    pub fn into_model(self) -> Result<RiskModel, MalformedInput> {
        let model = match self {
            RiskPolicy::Weighted => RiskModel::weighted(),
            RiskPolicy::RejectionPatterns(patterns) => patterns.into_model()?,
        };
        info!(
            factors = model.weights().len(),
            bands = model.bands().len(),
            "risk model ready"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::UserProfile;
    use chrono::{TimeZone, Utc};

    #[test]
    fn embedded_patterns_map_three_factors() {
        let model = RejectionPatterns::embedded()
            .and_then(RejectionPatterns::into_model)
            .expect("embedded patterns build a model");

        let factors: Vec<RiskFactor> = model.weights().iter().map(|w| w.factor).collect();
        assert_eq!(
            factors,
            vec![
                RiskFactor::ProfileCompleteness,
                RiskFactor::DocumentCompleteness,
                RiskFactor::DocumentValidity,
            ]
        );
        let levels: Vec<RiskLevel> = model.bands().iter().map(|b| b.level).collect();
        assert_eq!(
            levels,
            vec![RiskLevel::Critical, RiskLevel::Medium, RiskLevel::Low]
        );
    }

    #[test]
    fn pattern_model_scores_with_critical_band() {
        let model = RejectionPatterns::embedded()
            .and_then(RejectionPatterns::into_model)
            .expect("model");
        let now = Utc
            .with_ymd_and_hms(2025, 6, 1, 0, 0, 0)
            .single()
            .expect("instant");

        let result = model.score(&UserProfile::default(), &[], now);

        // 100 * .25 + 100 * .35 + 100 * .40
        assert_eq!(result.overall_risk, 100);
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert!(result.level_description.is_some());
        assert_eq!(result.breakdown.len(), 3);
        assert!(!result.breakdown[1].indicators.is_empty());
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let raw = r#"{
            "commonRejectionReasons": [],
            "riskFactors": {
                "low": {"threshold": 0},
                "medium": {"threshold": 80},
                "critical": {"threshold": 50}
            }
        }"#;
        let err = RejectionPatterns::from_json(raw).expect_err("unordered thresholds");
        assert!(err.detail().contains("thresholds"));
    }

    #[test]
    fn patterns_without_known_reasons_are_malformed() {
        let raw = r#"{
            "commonRejectionReasons": [{"reason": "Late submission", "weight": 1.0}],
            "riskFactors": {
                "low": {"threshold": 0},
                "medium": {"threshold": 40},
                "critical": {"threshold": 70}
            }
        }"#;
        let patterns = RejectionPatterns::from_json(raw).expect("parses");
        assert!(patterns.into_model().is_err());
    }

    #[test]
    fn weighted_policy_needs_no_files() {
        let config = ScoringConfig {
            risk_policy: RiskPolicyKind::Weighted,
            rejection_patterns: Some("/does/not/exist.json".into()),
            catalog: None,
        };
        let model = RiskPolicy::from_config(&config)
            .and_then(RiskPolicy::into_model)
            .expect("weighted model");
        assert_eq!(model, RiskModel::weighted());
    }

    #[test]
    fn missing_pattern_file_is_reported() {
        let config = ScoringConfig {
            risk_policy: RiskPolicyKind::RejectionPatterns,
            rejection_patterns: Some("/does/not/exist.json".into()),
            catalog: None,
        };
        let err = RiskPolicy::from_config(&config).expect_err("missing file");
        assert!(err.detail().contains("/does/not/exist.json"));
    }
}
