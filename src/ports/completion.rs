//! Text completion port - interface for LLM provider integrations.
//!
//! The engine treats the model as a black-box text-completion service:
//! a system instruction, an ordered history, one new user message, and
//! optionally a request for JSON-shaped output. Several interchangeable
//! backends implement this (Gemini, DeepSeek/Groq via the
//! OpenAI-compatible API); one is selected at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for text-completion providers.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Generate a single completion.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;

    /// Provider name for logging (e.g. "gemini", "deepseek").
    fn provider_name(&self) -> &str;
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction guiding model behavior.
    pub system_instruction: String,
    /// Prior conversation turns, oldest first.
    pub history: Vec<ChatMessage>,
    /// The new user message this turn responds to.
    pub user_message: String,
    /// Ask the provider for JSON-shaped output where supported.
    pub json_mode: bool,
    /// Sampling temperature (low for extraction, higher for dialogue).
    pub temperature: f32,
    /// Maximum tokens to generate, provider default when None.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Creates a request with conversational defaults.
    pub fn new(system_instruction: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            history: Vec::new(),
            user_message: user_message.into(),
            json_mode: false,
            temperature: 0.7,
            max_tokens: None,
        }
    }

    /// Sets the prior history.
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    /// Requests JSON-shaped output.
    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the generation cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Raw completion result.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text, unvalidated.
    pub content: String,
    /// Model that produced it.
    pub model: String,
}

/// Provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider rejected the credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Provider is down or erroring server-side.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// Network-level failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// Provider returned a body we could not read.
    #[error("failed to parse provider response: {message}")]
    Parse { message: String },

    /// Provider rejected the request shape.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// No provider credentials were configured at startup.
    #[error("no completion provider configured")]
    NotConfigured,
}

impl CompletionError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// True for failures a fallback provider might survive.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Unavailable { .. }
                | Self::Timeout { .. }
                | Self::Network { .. }
        )
    }
}
