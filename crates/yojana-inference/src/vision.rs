//! Vision prompt construction and reply parsing for photo signal extraction.
//!
//! The model is asked for a constrained JSON object
//! (`housing_type`, `assets`, `demographics`, `notes`). Replies arrive either
//! as one consolidated text field or as a list of content segments, and the
//! JSON is frequently wrapped in a fenced code block.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use yojana_core::{EligibilitySignals, Error, Result};

/// Fixed instruction sent with every photo.
pub const VISION_PROMPT: &str = "Analyze this image for Indian government welfare eligibility. \
Return JSON with keys: housing_type (kutcha/pucca/unknown), assets (list), \
demographics (list), notes (string). Keep lists short. ";

/// MIME type used when embedding the photo as a data URL.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Instruction text with form hints appended.
pub fn build_prompt(hints_json: &str) -> String {
    format!("{}Hints: {}", VISION_PROMPT, hints_json)
}

/// Drop a `data:<mime>;base64,` prefix if the caller sent a full data URL.
pub fn strip_data_url(image_base64: &str) -> &str {
    let trimmed = image_base64.trim();
    if trimmed.starts_with("data:") {
        if let Some((_, data)) = trimmed.split_once(',') {
            return data;
        }
    }
    trimmed
}

/// Data URL carrying the photo inline.
pub fn image_data_url(image_base64: &str) -> String {
    format!(
        "data:{};base64,{}",
        IMAGE_MIME_TYPE,
        strip_data_url(image_base64)
    )
}

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\n?").expect("valid opening fence pattern"));

static CLOSING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```$").expect("valid closing fence pattern"));

/// Strip surrounding code-block markers, if any.
pub fn clean_json_text(value: &str) -> String {
    let trimmed = value.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let without_open = OPENING_FENCE.replace(trimmed, "");
    CLOSING_FENCE
        .replace(&without_open, "")
        .trim()
        .to_string()
}

/// One content segment of a segmented reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplySegment {
    #[serde(default)]
    pub text: Option<String>,
}

/// One output entry of a segmented reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyOutput {
    #[serde(default)]
    pub content: Option<Vec<ReplySegment>>,
}

/// Raw body of a responses-API reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisionResponseBody {
    #[serde(default)]
    pub output_text: Option<String>,
    #[serde(default)]
    pub output: Option<Vec<ReplyOutput>>,
}

/// The two reply shapes the model endpoint produces.
#[derive(Debug, Clone, PartialEq)]
pub enum VisionReply {
    /// A single consolidated text field.
    Consolidated(String),
    /// Content segments to be concatenated in order.
    Segmented(Vec<String>),
}

impl From<VisionResponseBody> for VisionReply {
    fn from(body: VisionResponseBody) -> Self {
        match body.output_text {
            Some(text) if !text.trim().is_empty() => VisionReply::Consolidated(text),
            _ => VisionReply::Segmented(
                body.output
                    .unwrap_or_default()
                    .into_iter()
                    .flat_map(|entry| entry.content.unwrap_or_default())
                    .filter_map(|segment| segment.text)
                    .filter(|text| !text.is_empty())
                    .collect(),
            ),
        }
    }
}

impl VisionReply {
    /// Reply text with segments joined.
    pub fn text(&self) -> String {
        match self {
            VisionReply::Consolidated(text) => text.clone(),
            VisionReply::Segmented(segments) => segments.concat(),
        }
    }
}

/// Parse a reply into signals.
///
/// Fails with [`Error::Parse`] when there is no usable text or the text is
/// not a JSON signal object once fences are stripped.
pub fn parse_vision_reply(reply: &VisionReply) -> Result<EligibilitySignals> {
    let text = reply.text();
    if text.trim().is_empty() {
        return Err(Error::Parse(
            "Vision response did not include JSON text.".to_string(),
        ));
    }
    let cleaned = clean_json_text(&text);
    serde_json::from_str(&cleaned)
        .map_err(|e| Error::Parse(format!("Vision response was not valid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use yojana_core::HousingType;

    const BODY: &str = r#"{"housing_type": "kutcha", "assets": ["goat"], "demographics": ["elderly"], "notes": "thatched roof"}"#;

    #[test]
    fn test_prompt_includes_hints() {
        let prompt = build_prompt(r#"{"state":"Rajasthan"}"#);
        assert!(prompt.starts_with("Analyze this image"));
        assert!(prompt.ends_with(r#"Hints: {"state":"Rajasthan"}"#));
    }

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url(" AAAA "), "AAAA");
        assert_eq!(image_data_url("AAAA"), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_clean_json_text_variants() {
        assert_eq!(clean_json_text("```json\n{}\n```"), "{}");
        assert_eq!(clean_json_text("```JSON\n{}```"), "{}");
        assert_eq!(clean_json_text("```\n{}\n```"), "{}");
        assert_eq!(clean_json_text("  {}  "), "{}");
    }

    #[test]
    fn test_fenced_and_unfenced_parse_identically() {
        let plain = parse_vision_reply(&VisionReply::Consolidated(BODY.to_string())).unwrap();
        let fenced =
            parse_vision_reply(&VisionReply::Consolidated(format!("```json\n{}\n```", BODY)))
                .unwrap();
        assert_eq!(plain, fenced);
        assert_eq!(plain.housing_type, HousingType::Kutcha);
        assert_eq!(plain.notes.as_deref(), Some("thatched roof"));
    }

    #[test]
    fn test_segments_are_concatenated() {
        let (head, tail) = BODY.split_at(20);
        let reply = VisionReply::Segmented(vec![head.to_string(), tail.to_string()]);
        let signals = parse_vision_reply(&reply).unwrap();
        assert_eq!(signals.assets, vec!["goat"]);
    }

    #[test]
    fn test_body_prefers_non_blank_output_text() {
        let body: VisionResponseBody = serde_json::from_value(serde_json::json!({
            "output_text": "  ",
            "output": [
                {"content": [{"text": "{\"housing_type\":"}, {"type": "refusal"}]},
                {"content": [{"text": "\"pucca\"}"}]}
            ]
        }))
        .unwrap();
        let reply = VisionReply::from(body);
        assert_eq!(
            reply,
            VisionReply::Segmented(vec![
                "{\"housing_type\":".to_string(),
                "\"pucca\"}".to_string()
            ])
        );
        assert_eq!(
            parse_vision_reply(&reply).unwrap().housing_type,
            HousingType::Pucca
        );
    }

    #[test]
    fn test_empty_reply_is_parse_error() {
        let reply = VisionReply::from(VisionResponseBody::default());
        let err = parse_vision_reply(&reply).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn test_prose_reply_is_parse_error() {
        let reply = VisionReply::Consolidated("I see a small house.".to_string());
        let err = parse_vision_reply(&reply).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }
}
