//! Structured output contract for assistant turns.
//!
//! Every model turn must come back as `{text, suggestions, lead_status}`.
//! Models drift: they wrap JSON in markdown fences, prepend prose, or
//! ignore the schema entirely. `StructuredResponse::parse` absorbs all of
//! that deterministically - a malformed turn degrades to plain text and
//! never crashes the conversation.

use serde::{Deserialize, Serialize};

/// Canned degraded turn when the provider errors mid-conversation.
pub const FALLBACK_TEXT: &str =
    "Connection interrupted. Please email hi@svgvisual.com directly.";

/// Canned turn when no provider credentials are configured at all.
pub const NOT_CONFIGURED_TEXT: &str =
    "AI assistant is not configured. Please email hi@svgvisual.com directly.";

/// Whether the lead has finished the qualification flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// More fields to collect.
    InProgress,
    /// The closing turn: name, brand, contact and discovery insights
    /// are all present per the dialogue policy.
    Complete,
}

impl Default for TurnStatus {
    fn default() -> Self {
        Self::InProgress
    }
}

/// The shape every assistant turn must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResponse {
    /// Display text shown in the chat bubble.
    pub text: String,
    /// Suggestion chips. Populated only for bounded-choice questions.
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Completion flag, `lead_status` on the wire.
    #[serde(default, rename = "lead_status", alias = "status")]
    pub status: TurnStatus,
}

impl StructuredResponse {
    /// Builds a degraded response carrying raw text with no suggestions.
    pub fn degraded(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggestions: Vec::new(),
            status: TurnStatus::InProgress,
        }
    }

    /// Parses raw model output into the contract shape.
    ///
    /// Recovery ladder:
    /// 1. strict JSON parse of the whole payload
    /// 2. parse after stripping markdown code fences
    /// 3. parse the outermost `{...}` slice
    /// 4. fall back to the raw text as `text`, empty suggestions,
    ///    `in_progress`; an empty payload gets the fallback copy
    ///
    /// This function never fails; a broken turn must not break the
    /// conversation.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        // An empty body would otherwise degrade to an empty bubble;
        // the fallback copy keeps `text` non-empty in every case.
        if trimmed.is_empty() {
            return Self::degraded(FALLBACK_TEXT);
        }

        for candidate in parse_candidates(trimmed) {
            if let Ok(parsed) = serde_json::from_str::<StructuredResponse>(candidate) {
                // A schema-valid envelope with empty text is still a
                // broken turn; keep the raw payload visible instead.
                if !parsed.text.trim().is_empty() {
                    return parsed;
                }
            }
        }

        Self::degraded(trimmed)
    }

    /// True when this turn offers bounded choices (a type-A question).
    pub fn is_bounded_choice(&self) -> bool {
        !self.suggestions.is_empty()
    }
}

/// Yields progressively more lenient slices of the payload to try as JSON.
fn parse_candidates(trimmed: &str) -> Vec<&str> {
    let mut candidates = vec![trimmed];

    let unfenced = strip_code_fence(trimmed);
    if unfenced != trimmed {
        candidates.push(unfenced);
    }

    if let Some(slice) = outermost_slice(trimmed, '{', '}') {
        if slice != trimmed {
            candidates.push(slice);
        }
    }

    candidates
}

/// Strips a leading/trailing markdown code fence (``` or ```json).
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the optional language tag on the fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Returns the slice spanning the first `open` to the last `close`.
pub(crate) fn outermost_slice(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_well_formed_envelope() {
        let raw = r#"{"text":"Which service?","suggestions":["Web Design","Branding / Logo"],"lead_status":"in_progress"}"#;
        let resp = StructuredResponse::parse(raw);
        assert_eq!(resp.text, "Which service?");
        assert_eq!(resp.suggestions.len(), 2);
        assert_eq!(resp.status, TurnStatus::InProgress);
        assert!(resp.is_bounded_choice());
    }

    #[test]
    fn accepts_status_alias() {
        let raw = r#"{"text":"All set.","suggestions":[],"status":"complete"}"#;
        let resp = StructuredResponse::parse(raw);
        assert_eq!(resp.status, TurnStatus::Complete);
    }

    #[test]
    fn defaults_missing_fields() {
        let resp = StructuredResponse::parse(r#"{"text":"What is your name?"}"#);
        assert!(resp.suggestions.is_empty());
        assert_eq!(resp.status, TurnStatus::InProgress);
    }

    #[test]
    fn recovers_from_markdown_fence() {
        let raw = "```json\n{\"text\":\"Got it.\",\"suggestions\":[],\"lead_status\":\"complete\"}\n```";
        let resp = StructuredResponse::parse(raw);
        assert_eq!(resp.text, "Got it.");
        assert_eq!(resp.status, TurnStatus::Complete);
    }

    #[test]
    fn recovers_object_buried_in_prose() {
        let raw = "Here is the response:\n{\"text\":\"And your brand name?\"}\nHope that helps!";
        let resp = StructuredResponse::parse(raw);
        assert_eq!(resp.text, "And your brand name?");
    }

    #[test]
    fn malformed_payload_degrades_to_plain_text() {
        let raw = "We can do that. What industry is this for?";
        let resp = StructuredResponse::parse(raw);
        assert_eq!(resp.text, raw);
        assert!(resp.suggestions.is_empty());
        assert_eq!(resp.status, TurnStatus::InProgress);
    }

    #[test]
    fn empty_text_envelope_is_treated_as_malformed() {
        let raw = r#"{"text":"","suggestions":["A"],"lead_status":"complete"}"#;
        let resp = StructuredResponse::parse(raw);
        assert_eq!(resp.text, raw);
        assert!(resp.suggestions.is_empty());
        assert_eq!(resp.status, TurnStatus::InProgress);
    }

    #[test]
    fn empty_payload_degrades_to_fallback_copy() {
        for raw in ["", "   ", "\n\t"] {
            let resp = StructuredResponse::parse(raw);
            assert_eq!(resp.text, FALLBACK_TEXT);
            assert!(resp.suggestions.is_empty());
            assert_eq!(resp.status, TurnStatus::InProgress);
        }
    }

    #[test]
    fn strip_code_fence_handles_bare_fence() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("no fence"), "no fence");
    }

    proptest! {
        // The contract: parse never panics and always yields non-empty
        // display text, whatever the model sends back.
        #[test]
        fn parse_never_panics(raw in "\\PC*") {
            let resp = StructuredResponse::parse(&raw);
            prop_assert!(!resp.text.trim().is_empty());
        }
    }
}
