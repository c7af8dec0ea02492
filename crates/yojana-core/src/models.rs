//! Data models for eligibility signals, scheme matches and case memories.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Dense embedding vector.
pub type Vector = Vec<f32>;

/// Raw JSON object payload as stored in the vector store.
pub type Payload = Map<String, JsonValue>;

// =============================================================================
// SIGNALS
// =============================================================================

/// Dwelling construction type inferred from a photo or declared on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HousingType {
    /// Temporary construction (mud, thatch, tarpaulin).
    Kutcha,
    /// Permanent construction (brick, concrete).
    Pucca,
    #[default]
    Unknown,
}

impl HousingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kutcha => "kutcha",
            Self::Pucca => "pucca",
            Self::Unknown => "unknown",
        }
    }

    /// Parse leniently: anything unrecognised becomes `Unknown`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl FromStr for HousingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kutcha" => Ok(Self::Kutcha),
            "pucca" => Ok(Self::Pucca),
            "unknown" => Ok(Self::Unknown),
            other => Err(Error::Validation(format!("Unknown housing type: {}", other))),
        }
    }
}

impl fmt::Display for HousingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Model replies are free text, so a missing, null or unexpected value must
// still produce a housing type rather than fail the whole reply.
impl<'de> Deserialize<'de> for HousingType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(HousingType::parse_lenient)
            .unwrap_or_default())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Eligibility signals for one applicant household.
///
/// `housing_type` always has a value and the list fields are never null;
/// a missing or `null` list in incoming JSON becomes an empty list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EligibilitySignals {
    #[serde(default)]
    pub housing_type: HousingType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub assets: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub demographics: Vec<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub caste: Option<String>,
    #[serde(default)]
    pub land_acres: Option<f64>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// CALLER INPUT
// =============================================================================

/// Structured input for one orchestration run.
///
/// Produced by the caller (form UI, HTTP handler); the pipeline only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeInput {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub caste: Option<String>,
    #[serde(default)]
    pub land_acres: Option<f64>,
    #[serde(default)]
    pub housing_type: HousingType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub assets: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub demographics: Vec<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub use_vision: bool,
    /// Base64 photo, optionally carrying a `data:` URL prefix.
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl AnalyzeInput {
    /// Apply the form rules to a structured body: trimmed text with blanks
    /// as `None`, list entries trimmed with blanks dropped, and the land
    /// holding kept only when finite and non-negative.
    pub fn normalized(self) -> Self {
        Self {
            state: self.state.as_deref().and_then(normalize_text),
            caste: self.caste.as_deref().and_then(normalize_text),
            land_acres: self.land_acres.and_then(valid_land_acres),
            housing_type: self.housing_type,
            assets: normalize_list(&self.assets),
            demographics: normalize_list(&self.demographics),
            intent: self.intent.as_deref().and_then(normalize_text),
            use_vision: self.use_vision,
            image_base64: self.image_base64.filter(|img| !img.trim().is_empty()),
        }
    }
}

/// Raw form text exactly as typed by a user.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pub state: String,
    pub caste: String,
    pub land_acres: String,
    pub housing_type: HousingType,
    /// Comma-separated.
    pub assets: String,
    /// Comma-separated.
    pub demographics: String,
    pub intent: String,
    pub use_vision: bool,
    pub image_base64: Option<String>,
}

impl FormFields {
    /// Normalize the form into an [`AnalyzeInput`].
    pub fn into_input(self) -> AnalyzeInput {
        AnalyzeInput {
            state: normalize_text(&self.state),
            caste: normalize_text(&self.caste),
            land_acres: parse_land_acres(&self.land_acres),
            housing_type: self.housing_type,
            assets: parse_list(&self.assets),
            demographics: parse_list(&self.demographics),
            intent: normalize_text(&self.intent),
            use_vision: self.use_vision,
            image_base64: self.image_base64.filter(|img| !img.trim().is_empty()),
        }
    }
}

/// Trim; blank becomes `None`.
pub fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a comma list, trimming entries and dropping blanks.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_list(values: &[String]) -> Vec<String> {
    values.iter().filter_map(|v| normalize_text(v)).collect()
}

/// Keep a landholding only when it is finite and non-negative.
pub fn valid_land_acres(acres: f64) -> Option<f64> {
    (acres.is_finite() && acres >= 0.0).then_some(acres)
}

/// Parse a landholding in acres; blank, unparsable, negative or non-finite
/// values become `None`.
pub fn parse_land_acres(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().and_then(valid_land_acres)
}

// =============================================================================
// MATCH EXPLANATIONS
// =============================================================================

/// One signal value placed next to the scheme rule it was compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterMatch<S> {
    pub signal: S,
    /// Scheme-side rule value; `null` when the scheme does not declare one.
    pub rule: JsonValue,
}

/// Filters that actually constrained the search, keyed by filter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing: Option<FilterMatch<HousingType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<FilterMatch<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caste: Option<FilterMatch<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_acres: Option<FilterMatch<f64>>,
}

impl MatchedFilters {
    /// Filter names present, in fixed order.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.housing.is_some() {
            keys.push("housing");
        }
        if self.state.is_some() {
            keys.push("state");
        }
        if self.caste.is_some() {
            keys.push("caste");
        }
        if self.land_acres.is_some() {
            keys.push("land_acres");
        }
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

/// Explanation record for one matched scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeMatch {
    pub scheme_name: String,
    pub benefits: String,
    pub score: Option<f32>,
    pub matched_filters: MatchedFilters,
    pub notes: Option<String>,
}

/// Payload stored with each point of the scheme collection.
///
/// Every field is optional on read; points written by other tools may be
/// incomplete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemePayload {
    #[serde(default)]
    pub scheme_id: Option<JsonValue>,
    #[serde(default)]
    pub scheme_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub states: Option<JsonValue>,
    #[serde(default)]
    pub eligibility_rules: Option<Payload>,
    #[serde(default)]
    pub benefits: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl SchemePayload {
    /// Scheme identifier as a string; numeric ids are stringified.
    pub fn scheme_id_string(&self) -> Option<String> {
        match self.scheme_id.as_ref()? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Eligibility rule by name, `null` when absent.
    pub fn rule(&self, name: &str) -> JsonValue {
        self.eligibility_rules
            .as_ref()
            .and_then(|rules| rules.get(name))
            .cloned()
            .unwrap_or(JsonValue::Null)
    }
}

/// A welfare scheme as loaded from a seed file for ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub scheme_id: String,
    pub scheme_name: String,
    pub description: String,
    pub states: Vec<String>,
    #[serde(default)]
    pub eligibility_rules: Payload,
    pub benefits: String,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl Scheme {
    /// Deterministic point id derived from the scheme identifier.
    pub fn point_id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_DNS, self.scheme_id.as_bytes())
    }
}

// =============================================================================
// CASE MEMORY
// =============================================================================

/// Lifecycle of an application tracked by a case memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

/// Persisted record of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseMemory {
    pub signals: EligibilitySignals,
    pub query_intent: String,
    pub retrieved_scheme_ids: Vec<String>,
    /// Always `null` at creation; set later through a [`MemoryUpdate`].
    pub chosen_scheme_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CaseMemory {
    pub fn new(
        signals: EligibilitySignals,
        query_intent: impl Into<String>,
        retrieved_scheme_ids: Vec<String>,
    ) -> Self {
        Self {
            signals,
            query_intent: query_intent.into(),
            retrieved_scheme_ids,
            chosen_scheme_id: None,
            created_at: Utc::now(),
            status: None,
            feedback_score: None,
            notes: None,
            updated_at: None,
        }
    }

    /// Serialize into a vector store payload object.
    pub fn to_payload(&self) -> Result<Payload> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(Error::Serialization(format!(
                "Case memory serialized to non-object: {}",
                other
            ))),
        }
    }
}

/// Partial update applied to an existing case memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryUpdate {
    #[serde(default)]
    pub status: Option<CaseStatus>,
    #[serde(default)]
    pub feedback_score: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub chosen_scheme_id: Option<String>,
}

impl MemoryUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.status.is_none()
            && self.feedback_score.is_none()
            && self.notes.is_none()
            && self.chosen_scheme_id.is_none()
        {
            return Err(Error::Validation(
                "Provide at least one field to update".to_string(),
            ));
        }
        if let Some(score) = self.feedback_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(Error::Validation(format!(
                    "feedback_score must be between 0 and 1, got {}",
                    score
                )));
            }
        }
        Ok(())
    }

    /// Payload fields to overwrite, stamped with `updated_at`.
    pub fn to_payload(&self, now: DateTime<Utc>) -> Payload {
        let mut payload = Payload::new();
        payload.insert("updated_at".to_string(), JsonValue::from(now.to_rfc3339()));
        if let Some(status) = self.status {
            payload.insert("status".to_string(), serde_json::json!(status));
        }
        if let Some(score) = self.feedback_score {
            payload.insert("feedback_score".to_string(), JsonValue::from(score));
        }
        if let Some(ref notes) = self.notes {
            payload.insert("notes".to_string(), JsonValue::from(notes.clone()));
        }
        if let Some(ref chosen) = self.chosen_scheme_id {
            payload.insert(
                "chosen_scheme_id".to_string(),
                JsonValue::from(chosen.clone()),
            );
        }
        payload
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// Complete outcome of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    pub signals: EligibilitySignals,
    pub explanations: Vec<SchemeMatch>,
    pub memories: Vec<Payload>,
    pub memory_id: Uuid,
}
