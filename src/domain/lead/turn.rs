//! Conversation turns - the immutable units of a lead transcript.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The prospective client typing into the widget.
    User,
    /// The intake assistant.
    Assistant,
}

impl TurnRole {
    /// Stable string form used for persistence and transcript rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message in a lead transcript.
///
/// Turns are immutable once created; the transcript only grows by
/// appending. Suggestion chips are recorded alongside assistant turns so
/// the brief generator sees the bounded options that were offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who sent this turn.
    pub role: TurnRole,
    /// Display text.
    pub text: String,
    /// Suggestion chips offered with this turn (empty for user turns
    /// and for open-ended assistant questions).
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl ConversationTurn {
    /// Creates a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            suggestions: Vec::new(),
        }
    }

    /// Creates an assistant turn with optional suggestion chips.
    pub fn assistant(text: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turn_has_no_suggestions() {
        let turn = ConversationTurn::user("hello");
        assert_eq!(turn.role, TurnRole::User);
        assert!(turn.suggestions.is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&TurnRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn turn_deserializes_without_suggestions_field() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"user","text":"hi"}"#).unwrap();
        assert!(turn.suggestions.is_empty());
    }
}
