use chrono::{DateTime, Utc};
use serde::Serialize;

use super::factors::{FactorScores, RiskFactor};
use super::recommendations::{recommendations, Recommendation};
use crate::analyzer::domain::DocumentRecord;
use crate::error::MalformedInput;
use crate::profile::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorStatus {
    Critical,
    Warning,
    Good,
}

impl FactorStatus {
    pub fn of(score: f64) -> Self {
        if score >= 70.0 {
            FactorStatus::Critical
        } else if score >= 40.0 {
            FactorStatus::Warning
        } else {
            FactorStatus::Good
        }
    }
}

/// How much one factor counts toward the overall score.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorWeight {
    pub factor: RiskFactor,
    pub weight: f64,
    pub indicators: Vec<String>,
}

impl FactorWeight {
    pub fn new(factor: RiskFactor, weight: f64) -> Self {
        Self {
            factor,
            weight,
            indicators: Vec::new(),
        }
    }
}

/// Lower bound (inclusive) of a risk level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelBand {
    pub level: RiskLevel,
    pub threshold: f64,
    pub description: Option<String>,
}

impl LevelBand {
    pub fn new(level: RiskLevel, threshold: f64) -> Self {
        Self {
            level,
            threshold,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub factor: &'static str,
    pub score: f64,
    pub weight: f64,
    pub impact: f64,
    pub status: FactorStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    pub overall_risk: u8,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_description: Option<String>,
    pub breakdown: Vec<BreakdownEntry>,
    pub recommendations: Vec<Recommendation>,
}

/// A weight table plus level bands. Every scoring policy reduces to one of
/// these, so breakdowns and recommendations look the same whichever is
/// configured.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskModel {
    weights: Vec<FactorWeight>,
    bands: Vec<LevelBand>,
}

impl RiskModel {
    /// Bands may arrive in any order; they are kept highest threshold first.
    pub fn new(weights: Vec<FactorWeight>, mut bands: Vec<LevelBand>) -> Result<Self, MalformedInput> {
        if weights.is_empty() {
            return Err(MalformedInput::new("risk model needs at least one weighted factor"));
        }
        if let Some(bad) = weights
            .iter()
            .find(|entry| !entry.weight.is_finite() || entry.weight < 0.0)
        {
            return Err(MalformedInput::new(format!(
                "weight for {} must be a non-negative number",
                bad.factor.label()
            )));
        }
        if bands.is_empty() {
            return Err(MalformedInput::new("risk model needs at least one level band"));
        }
        if bands.iter().any(|band| !band.threshold.is_finite()) {
            return Err(MalformedInput::new("level thresholds must be numbers"));
        }
        bands.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
        Ok(Self { weights, bands })
    }

    /// Five-factor model: 15% profile, 30% document count, 35% document
    /// validity, 10% income, 10% age; HIGH from 70, MEDIUM from 40.
    pub fn weighted() -> Self {
        Self {
            weights: vec![
                FactorWeight::new(RiskFactor::ProfileCompleteness, 0.15),
                FactorWeight::new(RiskFactor::DocumentCompleteness, 0.30),
                FactorWeight::new(RiskFactor::DocumentValidity, 0.35),
                FactorWeight::new(RiskFactor::IncomeVerification, 0.10),
                FactorWeight::new(RiskFactor::AgeVerification, 0.10),
            ],
            bands: vec![
                LevelBand::new(RiskLevel::High, 70.0),
                LevelBand::new(RiskLevel::Medium, 40.0),
                LevelBand::new(RiskLevel::Low, 0.0),
            ],
        }
    }

    pub fn weights(&self) -> &[FactorWeight] {
        &self.weights
    }

    pub fn bands(&self) -> &[LevelBand] {
        &self.bands
    }

    pub fn score(
        &self,
        profile: &UserProfile,
        documents: &[DocumentRecord],
        now: DateTime<Utc>,
    ) -> RiskResult {
        let scores = FactorScores::compute(profile, documents);

        let breakdown: Vec<BreakdownEntry> = self
            .weights
            .iter()
            .map(|entry| {
                let score = scores.get(entry.factor);
                BreakdownEntry {
                    factor: entry.factor.label(),
                    score,
                    weight: (entry.weight * 10_000.0).round() / 100.0,
                    impact: score * entry.weight,
                    status: FactorStatus::of(score),
                    indicators: entry.indicators.clone(),
                }
            })
            .collect();

        let total: f64 = breakdown.iter().map(|entry| entry.impact).sum();
        let overall_risk = total.round().clamp(0.0, 100.0) as u8;
        let band = self.band_for(overall_risk);

        RiskResult {
            overall_risk,
            risk_level: band.map_or(RiskLevel::Low, |band| band.level),
            level_description: band.and_then(|band| band.description.clone()),
            breakdown,
            recommendations: recommendations(&scores, documents, now),
        }
    }

    fn band_for(&self, overall_risk: u8) -> Option<&LevelBand> {
        let score = f64::from(overall_risk);
        self.bands
            .iter()
            .find(|band| score >= band.threshold)
            .or_else(|| self.bands.last())
    }
}

impl Default for RiskModel {
    fn default() -> Self {
        Self::weighted()
    }
}

/// Score with the default five-factor model.
pub fn calculate_risk_score(
    profile: &UserProfile,
    documents: &[DocumentRecord],
    now: DateTime<Utc>,
) -> RiskResult {
    RiskModel::weighted().score(profile, documents, now)
}
