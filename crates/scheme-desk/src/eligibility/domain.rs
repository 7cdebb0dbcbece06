use std::fmt;

use serde::de::value::StringDeserializer;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MalformedInput;
use crate::profile::{Gender, SocialCategory};

/// Literal used by rule data to admit every value.
pub const ALL: &str = "All";

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd> Bounds<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.min <= *value && *value <= self.max
    }
}

/// A rule value that is either the `"All"` wildcard or one concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience<T> {
    All,
    Only(T),
}

impl<T: PartialEq> Audience<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Audience::All => true,
            Audience::Only(expected) => expected == value,
        }
    }
}

impl<T: Serialize> Serialize for Audience<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Audience::All => serializer.serialize_str(ALL),
            Audience::Only(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Audience<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == ALL {
            return Ok(Audience::All);
        }
        let inner: StringDeserializer<D::Error> = raw.into_deserializer();
        T::deserialize(inner).map(Audience::Only)
    }
}

impl fmt::Display for Audience<Gender> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Audience::All => f.write_str(ALL),
            Audience::Only(gender) => f.write_str(gender.label()),
        }
    }
}

impl fmt::Display for Audience<SocialCategory> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Audience::All => f.write_str(ALL),
            Audience::Only(category) => f.write_str(category.label()),
        }
    }
}

/// Declarative eligibility constraints attached to a scheme. An absent key
/// means the criterion is not evaluated at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemeRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<Bounds<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income: Option<Bounds<f64>>,
    #[serde(deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,
    #[serde(
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<Audience<Gender>>,
    #[serde(
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Vec<Audience<SocialCategory>>>,
}

impl SchemeRule {
    pub fn from_json(raw: &str) -> Result<Self, MalformedInput> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedInput> {
        if !value.is_object() {
            return Err(MalformedInput::new("eligibility rules must be a JSON object"));
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

fn audience<'de, T, E>(raw: String) -> Result<Audience<T>, E>
where
    T: Deserialize<'de>,
    E: serde::de::Error,
{
    let inner: StringDeserializer<E> = raw.into_deserializer();
    Audience::deserialize(inner)
}

/// `null` reads as "no state restriction".
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` and `""` both leave the criterion unset.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<Audience<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.is_empty() => audience::<T, D::Error>(raw).map(Some),
        _ => Ok(None),
    }
}

/// A single value or a list. A blank single value leaves the criterion
/// unset; blank entries inside a list are dropped, but the list itself still
/// counts as a criterion.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Option<Vec<Audience<T>>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<OneOrMany<String>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(OneOrMany::One(raw)) if raw.is_empty() => Ok(None),
        Some(OneOrMany::One(raw)) => audience::<T, D::Error>(raw).map(|single| Some(vec![single])),
        Some(OneOrMany::Many(many)) => many
            .into_iter()
            .filter(|raw| !raw.is_empty())
            .map(audience::<T, D::Error>)
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeCategory {
    Agriculture,
    Health,
    Education,
    Housing,
    Business,
    Pension,
    #[serde(rename = "Women Empowerment")]
    WomenEmpowerment,
    #[serde(rename = "Social Welfare")]
    SocialWelfare,
}

impl SchemeCategory {
    pub const fn label(self) -> &'static str {
        match self {
            SchemeCategory::Agriculture => "Agriculture",
            SchemeCategory::Health => "Health",
            SchemeCategory::Education => "Education",
            SchemeCategory::Housing => "Housing",
            SchemeCategory::Business => "Business",
            SchemeCategory::Pension => "Pension",
            SchemeCategory::WomenEmpowerment => "Women Empowerment",
            SchemeCategory::SocialWelfare => "Social Welfare",
        }
    }

    /// Case-insensitive lookup by label, tolerant of `-`/`_` in URLs.
    pub fn from_label(raw: &str) -> Option<Self> {
        let wanted = raw.trim().replace(['-', '_'], " ");
        [
            SchemeCategory::Agriculture,
            SchemeCategory::Health,
            SchemeCategory::Education,
            SchemeCategory::Housing,
            SchemeCategory::Business,
            SchemeCategory::Pension,
            SchemeCategory::WomenEmpowerment,
            SchemeCategory::SocialWelfare,
        ]
        .into_iter()
        .find(|category| category.label().eq_ignore_ascii_case(&wanted))
    }
}

/// A government welfare programme as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    pub id: String,
    pub name: String,
    pub category: SchemeCategory,
    pub description: String,
    pub eligibility_rules: SchemeRule,
    pub documents_required: Vec<String>,
    pub benefits: String,
}
