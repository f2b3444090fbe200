//! Request/response DTOs for the REST surface.

use serde::{Deserialize, Serialize};

use crate::domain::lead::ConversationTurn;

/// POST /api/chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Prior transcript as the widget saw it, oldest first.
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    pub lead_id: String,
}

/// POST /api/leads response body.
#[derive(Debug, Serialize)]
pub struct CreateLeadResponse {
    pub lead_id: String,
}

/// POST /api/billing/assistant request body.
#[derive(Debug, Deserialize)]
pub struct BillingAssistRequest {
    pub prompt: String,
}

/// Standard error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
