use serde::{Deserialize, Serialize};

/// Number of fields counted when scoring profile completeness
/// (name, email, age, income, state, district).
pub const REQUIRED_PROFILE_FIELDS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

/// Social category used by reservation-based schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialCategory {
    General,
    #[serde(rename = "OBC")]
    Obc,
    #[serde(rename = "SC")]
    Sc,
    #[serde(rename = "ST")]
    St,
    #[serde(rename = "EWS")]
    Ews,
}

impl SocialCategory {
    pub const fn label(self) -> &'static str {
        match self {
            SocialCategory::General => "General",
            SocialCategory::Obc => "OBC",
            SocialCategory::Sc => "SC",
            SocialCategory::St => "ST",
            SocialCategory::Ews => "EWS",
        }
    }
}

/// Applicant profile as captured at registration. Every attribute is optional
/// because partially filled profiles still get evaluated and scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<SocialCategory>,
}

impl UserProfile {
    /// Count of required fields that are present and not an empty string.
    pub fn filled_required_fields(&self) -> usize {
        let text = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

        [
            text(&self.name),
            text(&self.email),
            self.age.is_some(),
            self.income.is_some(),
            text(&self.state),
            text(&self.district),
        ]
        .into_iter()
        .filter(|filled| *filled)
        .count()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_do_not_count_as_filled() {
        let profile = UserProfile {
            name: Some("Asha Verma".to_string()),
            email: Some(String::new()),
            age: Some(0),
            income: Some(0.0),
            state: None,
            district: Some("Pune".to_string()),
            ..UserProfile::default()
        };

        assert_eq!(profile.filled_required_fields(), 4);
    }

    #[test]
    fn categories_use_official_abbreviations() {
        let parsed: SocialCategory = serde_json::from_str("\"OBC\"").expect("category parses");
        assert_eq!(parsed, SocialCategory::Obc);
        assert_eq!(
            serde_json::to_string(&SocialCategory::Ews).expect("serializes"),
            "\"EWS\""
        );
    }
}
