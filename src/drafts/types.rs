use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identity pair of one rateable recommendation on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId {
    pub article_id: String,
    pub recommendation_id: String,
}

impl ItemId {
    pub fn new(article_id: impl Into<String>, recommendation_id: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            recommendation_id: recommendation_id.into(),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.article_id, self.recommendation_id)
    }
}

/// A value on the 1..=5 rating scale.
///
/// Serialized as its decimal string (`"3"`), which is what the rating
/// select on the page carries. Numbers are accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Rating {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("not a rating: {:?}", s))?;
        Self::new(value).ok_or_else(|| {
            anyhow::anyhow!(
                "rating {} outside {}..={}",
                value,
                Self::MIN,
                Self::MAX
            )
        })
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        parse_rating_value(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid rating: {}", raw)))
    }
}

/// Interpret a loosely-typed JSON value as a rating.
fn parse_rating_value(raw: &serde_json::Value) -> Option<Rating> {
    match raw {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .and_then(Rating::new),
        _ => None,
    }
}

/// Persisted draft of one item: `{"rating": "3", "comment": "..."}`.
///
/// An unrated draft stores `""` as its rating and is kept, but never
/// submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRecord {
    #[serde(with = "optional_rating", default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub comment: String,
}

/// A rated item ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackItem {
    pub id: ItemId,
    pub rating: Rating,
    pub comment: String,
}

/// `Option<Rating>` as the select value: empty string when unrated.
/// Unreadable values come back as unrated rather than failing the record.
mod optional_rating {
    use super::{parse_rating_value, Rating};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Rating>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(rating) => serializer.collect_str(rating),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Rating>, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(parse_rating_value(&raw))
    }
}
