//! Lead lifecycle completeness.

use serde::{Deserialize, Serialize};

/// Tri-state completeness signal for a lead record.
///
/// `InProgress` -> `Complete` is declared by the model on the closing
/// turn; `Complete` -> `Qualified` is flipped by the completion pipeline
/// once the executive brief has been generated and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadCompleteness {
    /// Qualification fields still being gathered.
    InProgress,
    /// The closing turn reported all fields collected.
    Complete,
    /// Brief generated and persisted; lead handed to a human.
    Qualified,
}

impl Default for LeadCompleteness {
    fn default() -> Self {
        Self::InProgress
    }
}

impl LeadCompleteness {
    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::Qualified => "qualified",
        }
    }

    /// Parses the persisted string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(Self::InProgress),
            "complete" => Some(Self::Complete),
            "qualified" => Some(Self::Qualified),
            _ => None,
        }
    }
}
