//! Signal merging and deterministic summaries.
//!
//! Summaries are used both as embedding queries and as human-readable case
//! descriptions, so segment order is fixed: identical records must always
//! embed identically.

use serde_json::json;

use crate::defaults::FALLBACK_NOTE;
use crate::models::{valid_land_acres, AnalyzeInput, EligibilitySignals, HousingType};

/// Signal record used when no photo analysis was requested.
pub fn fallback_signals() -> EligibilitySignals {
    EligibilitySignals {
        housing_type: HousingType::Unknown,
        assets: Vec::new(),
        demographics: Vec::new(),
        notes: Some(FALLBACK_NOTE.to_string()),
        ..Default::default()
    }
}

/// Overlay form input on top of base (usually model-inferred) signals.
///
/// Non-null form fields win. An explicit `unknown` housing type never erases
/// a known base value. Form lists replace the base lists outright. Blank
/// base text and negative or non-finite base acreage are discarded.
pub fn merge_signals(form: &AnalyzeInput, base: EligibilitySignals) -> EligibilitySignals {
    let housing_type = if form.housing_type.is_known() {
        form.housing_type
    } else {
        base.housing_type
    };

    EligibilitySignals {
        housing_type,
        assets: form.assets.clone(),
        demographics: form.demographics.clone(),
        state: form.state.clone().or(base.state.filter(|s| !s.trim().is_empty())),
        caste: form.caste.clone().or(base.caste.filter(|c| !c.trim().is_empty())),
        land_acres: form
            .land_acres
            .or_else(|| base.land_acres.and_then(valid_land_acres)),
        intent: form.intent.clone().or(base.intent),
        notes: base.notes,
    }
}

/// `key=value` segments joined by `" | "` in fixed order: housing, state,
/// caste, land_acres, assets, demographics, intent, notes.
pub fn summarize(signals: &EligibilitySignals) -> String {
    let mut segments = vec![format!("housing={}", signals.housing_type)];

    if let Some(state) = non_empty(&signals.state) {
        segments.push(format!("state={}", state));
    }
    if let Some(caste) = non_empty(&signals.caste) {
        segments.push(format!("caste={}", caste));
    }
    if let Some(acres) = signals.land_acres {
        segments.push(format!("land_acres={}", acres));
    }
    if !signals.assets.is_empty() {
        segments.push(format!("assets={}", signals.assets.join(", ")));
    }
    if !signals.demographics.is_empty() {
        segments.push(format!("demographics={}", signals.demographics.join(", ")));
    }
    if let Some(intent) = non_empty(&signals.intent) {
        segments.push(format!("intent={}", intent));
    }
    if let Some(notes) = non_empty(&signals.notes) {
        segments.push(format!("notes={}", notes));
    }

    segments.join(" | ")
}

/// Case description embedded when a memory is saved.
pub fn memory_summary(signals: &EligibilitySignals, query_intent: &str) -> String {
    format!("intent={} | {}", query_intent, summarize(signals))
}

/// Text sent for embedding: the intent when given, else the signal summary.
pub fn query_text(intent: Option<&str>, signals: &EligibilitySignals) -> String {
    match intent.map(str::trim).filter(|i| !i.is_empty()) {
        Some(intent) => intent.to_string(),
        None => summarize(signals),
    }
}

/// Form context passed to the vision model alongside the photo.
pub fn vision_hints(input: &AnalyzeInput) -> String {
    json!({
        "state": input.state,
        "caste": input.caste,
        "land_acres": input.land_acres,
    })
    .to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pucca_base() -> EligibilitySignals {
        EligibilitySignals {
            housing_type: HousingType::Pucca,
            assets: vec!["television".to_string()],
            demographics: vec!["elderly".to_string()],
            state: Some("Bihar".to_string()),
            caste: Some("OBC".to_string()),
            land_acres: Some(3.0),
            intent: Some("pension".to_string()),
            notes: Some("brick walls".to_string()),
        }
    }

    #[test]
    fn test_unknown_form_housing_keeps_base() {
        let form = AnalyzeInput::default();
        let merged = merge_signals(&form, pucca_base());
        assert_eq!(merged.housing_type, HousingType::Pucca);
    }

    #[test]
    fn test_known_form_housing_overrides_base() {
        let form = AnalyzeInput {
            housing_type: HousingType::Kutcha,
            ..Default::default()
        };
        let merged = merge_signals(&form, pucca_base());
        assert_eq!(merged.housing_type, HousingType::Kutcha);
    }

    #[test]
    fn test_form_fields_win_when_present() {
        let form = AnalyzeInput {
            state: Some("Rajasthan".to_string()),
            caste: Some("SC".to_string()),
            land_acres: Some(1.5),
            intent: Some("housing support".to_string()),
            ..Default::default()
        };
        let merged = merge_signals(&form, pucca_base());
        assert_eq!(merged.state.as_deref(), Some("Rajasthan"));
        assert_eq!(merged.caste.as_deref(), Some("SC"));
        assert_eq!(merged.land_acres, Some(1.5));
        assert_eq!(merged.intent.as_deref(), Some("housing support"));
        assert_eq!(merged.notes.as_deref(), Some("brick walls"));
    }

    #[test]
    fn test_absent_form_fields_keep_base() {
        let merged = merge_signals(&AnalyzeInput::default(), pucca_base());
        assert_eq!(merged.state.as_deref(), Some("Bihar"));
        assert_eq!(merged.caste.as_deref(), Some("OBC"));
        assert_eq!(merged.land_acres, Some(3.0));
        assert_eq!(merged.intent.as_deref(), Some("pension"));
    }

    #[test]
    fn test_invalid_model_values_are_dropped() {
        let base = EligibilitySignals {
            state: Some(" ".to_string()),
            caste: Some(String::new()),
            land_acres: Some(-4.0),
            ..pucca_base()
        };
        let merged = merge_signals(&AnalyzeInput::default(), base);
        assert!(merged.state.is_none());
        assert!(merged.caste.is_none());
        assert!(merged.land_acres.is_none());
        assert_eq!(merged.housing_type, HousingType::Pucca);
    }

    #[test]
    fn test_form_lists_replace_base_lists() {
        let form = AnalyzeInput {
            assets: vec!["goat".to_string()],
            ..Default::default()
        };
        let merged = merge_signals(&form, pucca_base());
        assert_eq!(merged.assets, vec!["goat"]);
        assert!(merged.demographics.is_empty());
    }

    #[test]
    fn test_summarize_full_order() {
        assert_eq!(
            summarize(&pucca_base()),
            "housing=pucca | state=Bihar | caste=OBC | land_acres=3 | assets=television | \
             demographics=elderly | intent=pension | notes=brick walls"
        );
    }

    #[test]
    fn test_summarize_minimal() {
        assert_eq!(summarize(&EligibilitySignals::default()), "housing=unknown");
    }

    #[test]
    fn test_summarize_skips_empty_strings() {
        let signals = EligibilitySignals {
            state: Some(String::new()),
            land_acres: Some(1.5),
            assets: vec!["cow".to_string(), "bicycle".to_string()],
            ..Default::default()
        };
        assert_eq!(
            summarize(&signals),
            "housing=unknown | land_acres=1.5 | assets=cow, bicycle"
        );
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let a = pucca_base();
        let b = a.clone();
        assert_eq!(summarize(&a), summarize(&b));
    }

    #[test]
    fn test_memory_summary_prefix() {
        let summary = memory_summary(&EligibilitySignals::default(), "housing support");
        assert_eq!(summary, "intent=housing support | housing=unknown");
    }

    #[test]
    fn test_query_text_prefers_intent() {
        let signals = pucca_base();
        assert_eq!(query_text(Some("housing support"), &signals), "housing support");
        assert_eq!(query_text(Some("  "), &signals), summarize(&signals));
        assert_eq!(query_text(None, &signals), summarize(&signals));
    }

    #[test]
    fn test_fallback_signals() {
        let signals = fallback_signals();
        assert_eq!(signals.housing_type, HousingType::Unknown);
        assert!(signals.assets.is_empty());
        assert_eq!(signals.notes.as_deref(), Some(FALLBACK_NOTE));
    }

    #[test]
    fn test_vision_hints_keeps_nulls() {
        let input = AnalyzeInput {
            state: Some("Rajasthan".to_string()),
            ..Default::default()
        };
        let hints: serde_json::Value = serde_json::from_str(&vision_hints(&input)).unwrap();
        assert_eq!(hints["state"], "Rajasthan");
        assert!(hints["caste"].is_null());
        assert!(hints["land_acres"].is_null());
    }
}
