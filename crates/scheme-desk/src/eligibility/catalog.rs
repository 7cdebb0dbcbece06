use std::path::Path;

use serde::Serialize;

use super::domain::{Scheme, SchemeCategory};
use super::rules::{evaluate_eligibility, EligibilityResult};
use crate::error::MalformedInput;
use crate::profile::UserProfile;

const EMBEDDED_CATALOG: &str = include_str!("../../data/schemes.json");

/// A scheme paired with how well a profile fits it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeMatch {
    #[serde(flatten)]
    pub scheme: Scheme,
    #[serde(flatten)]
    pub eligibility: EligibilityResult,
}

/// Immutable scheme reference table, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeCatalog {
    schemes: Vec<Scheme>,
}

impl SchemeCatalog {
    pub fn new(mut schemes: Vec<Scheme>) -> Self {
        schemes.sort_by(|a, b| a.name.cmp(&b.name));
        Self { schemes }
    }

    pub fn from_json(raw: &str) -> Result<Self, MalformedInput> {
        let schemes: Vec<Scheme> = serde_json::from_str(raw)?;
        Ok(Self::new(schemes))
    }

    /// The national schemes bundled with the crate.
    pub fn embedded() -> Result<Self, MalformedInput> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, MalformedInput> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            MalformedInput::new(format!("failed to read catalog {}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn all(&self) -> &[Scheme] {
        &self.schemes
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Scheme> {
        self.schemes.iter().find(|scheme| scheme.id == id)
    }

    pub fn by_category(&self, category: SchemeCategory) -> Vec<&Scheme> {
        self.schemes
            .iter()
            .filter(|scheme| scheme.category == category)
            .collect()
    }

    /// Every scheme with its evaluation, best fit first. Ties keep catalog
    /// order.
    pub fn rank(&self, profile: &UserProfile) -> Vec<SchemeMatch> {
        let mut ranked: Vec<SchemeMatch> = self
            .schemes
            .iter()
            .map(|scheme| SchemeMatch {
                eligibility: evaluate_eligibility(profile, &scheme.eligibility_rules),
                scheme: scheme.clone(),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.eligibility
                .match_percentage
                .cmp(&a.eligibility.match_percentage)
        });
        ranked
    }

    pub fn eligible(&self, profile: &UserProfile) -> Vec<SchemeMatch> {
        self.rank(profile)
            .into_iter()
            .filter(|matched| matched.eligibility.is_eligible)
            .collect()
    }
}
