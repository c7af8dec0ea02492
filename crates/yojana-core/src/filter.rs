//! Eligibility filter construction for scheme search.
//!
//! Housing, caste and landholding are hard gates (`must`). State is a soft
//! preference (`should`) matched against either the applicant's state or the
//! nationwide `"All"` marker.
//!
//! The land clause compares the scheme's `land_max_acres` with the
//! applicant's holding as `land_max_acres <= land_acres`.

use serde::{Deserialize, Serialize};

use crate::defaults::ALL_STATES;
use crate::models::EligibilitySignals;

/// Payload key holding the list of states a scheme applies to.
pub const KEY_STATES: &str = "states";
/// Payload key holding the required housing type.
pub const KEY_HOUSING: &str = "eligibility_rules.housing";
/// Payload key holding the eligible caste category.
pub const KEY_CASTE: &str = "eligibility_rules.caste";
/// Payload key holding the maximum landholding in acres.
pub const KEY_LAND_MAX_ACRES: &str = "eligibility_rules.land_max_acres";

/// Predicate applied to a single payload field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Predicate {
    /// Exact keyword match.
    Match { value: String },
    /// Numeric range bound.
    Range { lte: f64 },
}

/// One field condition, serialized in the vector store's wire shape:
/// `{"key": ..., "match": {"value": ...}}` or `{"key": ..., "range": {"lte": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub key: String,
    #[serde(flatten)]
    pub predicate: Predicate,
}

impl FieldCondition {
    pub fn matches(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            predicate: Predicate::Match {
                value: value.into(),
            },
        }
    }

    pub fn at_most(key: &str, lte: f64) -> Self {
        Self {
            key: key.to_string(),
            predicate: Predicate::Range { lte },
        }
    }
}

/// Structured eligibility predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Every condition must hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<FieldCondition>,
    /// At least one condition should hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<FieldCondition>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }
}

/// Build the eligibility filter for `signals`.
///
/// Returns `None` when no clause applies, meaning a pure similarity search.
pub fn build_filter(signals: &EligibilitySignals) -> Option<FilterSpec> {
    let mut filter = FilterSpec::default();

    if let Some(state) = signals.state.as_deref().filter(|s| !s.is_empty()) {
        filter.should.push(FieldCondition::matches(KEY_STATES, state));
        filter
            .should
            .push(FieldCondition::matches(KEY_STATES, ALL_STATES));
    }
    if signals.housing_type.is_known() {
        filter.must.push(FieldCondition::matches(
            KEY_HOUSING,
            signals.housing_type.as_str(),
        ));
    }
    if let Some(caste) = signals.caste.as_deref().filter(|c| !c.is_empty()) {
        filter.must.push(FieldCondition::matches(KEY_CASTE, caste));
    }
    if let Some(acres) = signals.land_acres {
        filter
            .must
            .push(FieldCondition::at_most(KEY_LAND_MAX_ACRES, acres));
    }

    if filter.is_empty() {
        None
    } else {
        Some(filter)
    }
}
