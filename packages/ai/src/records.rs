//! Typed extraction records and the parsing that turns model text into
//! them.
//!
//! Models are asked for `snake_case` JSON. Responses are accepted with or
//! without a Markdown code fence and, for list-shaped answers, either as
//! a bare array or as an object wrapping one array. Anything else is an
//! [`AiError::Schema`].

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::AiError;

/// Lowest danger level on the extraction scale (safe).
pub const MIN_DANGER_LEVEL: u8 = 1;

/// Highest danger level on the extraction scale (potential loss of life).
pub const MAX_DANGER_LEVEL: u8 = 5;

/// A danger level in `1..=5`.
///
/// Deserializes from either a JSON number or a numeric string, since
/// models produce both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDangerLevel", into = "u8")]
pub struct DangerLevel(u8);

impl DangerLevel {
    /// Creates a danger level.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Schema`] if `value` is outside `1..=5`.
    pub fn new(value: u8) -> Result<Self, AiError> {
        if (MIN_DANGER_LEVEL..=MAX_DANGER_LEVEL).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AiError::schema(format!(
                "danger level {value} outside {MIN_DANGER_LEVEL}..={MAX_DANGER_LEVEL}"
            )))
        }
    }

    /// The numeric level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<DangerLevel> for u8 {
    fn from(level: DangerLevel) -> Self {
        level.0
    }
}

impl fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDangerLevel {
    Number(i64),
    Text(String),
}

impl TryFrom<RawDangerLevel> for DangerLevel {
    type Error = String;

    fn try_from(raw: RawDangerLevel) -> Result<Self, Self::Error> {
        let value = match raw {
            RawDangerLevel::Number(n) => n,
            RawDangerLevel::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("danger level {s:?} is not a number"))?,
        };
        u8::try_from(value)
            .ok()
            .and_then(|v| Self::new(v).ok())
            .ok_or_else(|| {
                format!("danger level {value} outside {MIN_DANGER_LEVEL}..={MAX_DANGER_LEVEL}")
            })
    }
}

/// Structured assessment of one news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DangerRecord {
    /// Article headline.
    pub title: String,
    /// Most specific place the disaster is affecting. May be empty when
    /// the article names no place.
    #[serde(default)]
    pub location: String,
    /// Lowercase disaster type, e.g. `bushfire` or `flood`.
    #[serde(alias = "disaster_type")]
    pub disaster_type: String,
    /// Emergency contact number mentioned in the article, or empty.
    #[serde(
        default,
        alias = "emergency_no",
        alias = "emergency_number",
        alias = "emergencyNo",
        deserialize_with = "string_or_number"
    )]
    pub emergency_number: String,
    /// Severity on the `1..=5` scale.
    #[serde(alias = "danger_level")]
    pub danger_level: DangerLevel,
    /// Short summary of how the disaster is developing.
    #[serde(default)]
    pub summary: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
        Raw::Null => String::new(),
    })
}

/// Whether a monitored location is currently in danger.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "snake_case", try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum DangerStatus {
    /// Posts report an active disaster at the location.
    Dangerous,
    /// No disaster reports for the location.
    NotDangerous,
}

impl FromStr for DangerStatus {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "dangerous" => Ok(Self::Dangerous),
            "not_dangerous" => Ok(Self::NotDangerous),
            _ => Err(AiError::schema(format!("unknown location status {s:?}"))),
        }
    }
}

impl TryFrom<String> for DangerStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse().map_err(|e: AiError| e.to_string())
    }
}

/// Danger status of one government-monitored location, as correlated
/// against social-media posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStatus {
    /// The monitored location.
    #[serde(alias = "location_name", alias = "location")]
    pub location_name: String,
    /// Whether it is in danger.
    pub status: DangerStatus,
}

impl LocationStatus {
    /// Whether this location should be shown as a danger zone.
    #[must_use]
    pub fn is_dangerous(&self) -> bool {
        self.status == DangerStatus::Dangerous
    }
}

/// Safety advice for the current disaster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    /// Suitable vehicle for moving through the affected area.
    #[serde(alias = "vehicle_advice")]
    pub vehicle_advice: String,
    /// Protective clothing for the conditions.
    #[serde(alias = "clothing_advice")]
    pub clothing_advice: String,
    /// One or two sentences of general guidance.
    #[serde(alias = "general_advice")]
    pub general_advice: String,
}

/// A location the disaster is expected to reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Place name, suitable for geocoding.
    pub location: String,
    /// When the prediction was made, as reported by the model.
    #[serde(default, alias = "predicted_time")]
    pub predicted_time: String,
    /// Expected time of impact.
    #[serde(default, alias = "time_of_impact")]
    pub time_of_impact: String,
}

/// Strips a surrounding Markdown code fence (with or without a language
/// tag) from model output.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses a single JSON object record.
///
/// # Errors
///
/// Returns [`AiError::Schema`] if the text is not JSON or does not match
/// `T`.
pub fn parse_record<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| AiError::schema(format!("{e} in response {}", preview(text))))
}

/// Parses a list of records.
///
/// Accepts a bare JSON array, an object whose only array-valued field
/// holds the records (JSON response mode forces an object at the top
/// level), or a single record object.
///
/// # Errors
///
/// Returns [`AiError::Schema`] if no list of `T` can be found.
pub fn parse_list<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, AiError> {
    let value: serde_json::Value = parse_record(text)?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => {
            let mut arrays = map.values().filter_map(serde_json::Value::as_array);
            match (arrays.next(), arrays.next()) {
                (Some(items), None) => items.clone(),
                (Some(_), Some(_)) => {
                    return Err(AiError::schema(format!(
                        "ambiguous list response with several arrays: {}",
                        preview(text)
                    )));
                }
                (None, _) => {
                    let single = serde_json::from_value(serde_json::Value::Object(map))
                        .map_err(|e| AiError::schema(format!("expected a list: {e}")))?;
                    return Ok(vec![single]);
                }
            }
        }
        other => {
            return Err(AiError::schema(format!(
                "expected a list, got {}",
                preview(&other.to_string())
            )));
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| AiError::schema(format!("list item: {e}")))
        })
        .collect()
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Renders location statuses as a Markdown table.
#[must_use]
pub fn statuses_to_markdown(statuses: &[LocationStatus]) -> String {
    let mut out = String::from("| location_name | status |\n|---|---|\n");
    for status in statuses {
        out.push_str(&format!(
            "| {} | {} |\n",
            status.location_name.replace('|', "\\|"),
            status.status
        ));
    }
    out
}

/// Renders location names as a Markdown bullet list.
#[must_use]
pub fn locations_to_markdown(locations: &[String]) -> String {
    locations.iter().map(|l| format!("- {l}\n")).collect()
}
