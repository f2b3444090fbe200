//! OpenAI-compatible provider - TextCompletion over the chat-completions
//! API shape shared by DeepSeek and Groq.
//!
//! Both vendors were tried over time for the billing assistant; the only
//! differences are base URL and model name, so one adapter covers both.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    ChatRole, CompletionError, CompletionRequest, CompletionResponse, TextCompletion,
};

/// Configuration for an OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    api_key: Secret<String>,
    /// Provider label for logging ("deepseek", "groq").
    pub name: String,
    /// Model identifier (e.g. "deepseek-chat", "llama-3.1-8b-instant").
    pub model: String,
    /// Base URL up to and including the version segment.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiCompatConfig {
    /// DeepSeek defaults.
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            name: "deepseek".to_string(),
            model: "deepseek-chat".to_string(),
            base_url: "https://api.deepseek.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Groq defaults.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            name: "groq".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible chat-completions provider.
pub struct OpenAiCompatProvider {
    config: OpenAiCompatConfig,
    client: Client,
}

impl OpenAiCompatProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::network(format!("failed to build client: {e}")))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts our request to the chat-completions wire format.
    fn to_wire_request(&self, request: &CompletionRequest) -> WireRequest {
        let mut messages = vec![WireMessage {
            role: "system".to_string(),
            content: request.system_instruction.clone(),
        }];

        for msg in &request.history {
            messages.push(WireMessage {
                role: match msg.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            });
        }

        messages.push(WireMessage {
            role: "user".to_string(),
            content: request.user_message.clone(),
        });

        WireRequest {
            model: self.config.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }

    async fn handle_response_status(
        &self,
        response: Response,
    ) -> Result<Response, CompletionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(CompletionError::AuthenticationFailed),
            429 => Err(CompletionError::RateLimited {
                retry_after_secs: 30,
            }),
            400 => Err(CompletionError::InvalidRequest {
                message: error_body,
            }),
            500..=599 => Err(CompletionError::unavailable(format!(
                "server error {status}: {error_body}"
            ))),
            _ => Err(CompletionError::network(format!(
                "unexpected status {status}: {error_body}"
            ))),
        }
    }
}

#[async_trait]
impl TextCompletion for OpenAiCompatProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let body = self.to_wire_request(&request);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    CompletionError::network(format!("connection failed: {e}"))
                } else {
                    CompletionError::network(e.to_string())
                }
            })?;

        let response = self.handle_response_status(response).await?;

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::parse(format!("failed to parse response: {e}")))?;

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::parse("no choices in response"))?;

        Ok(CompletionResponse {
            content: choice.message.content,
            model: wire.model,
        })
    }

    fn provider_name(&self) -> &str {
        &self.config.name
    }
}

// Wire types for the chat-completions endpoint.

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    model: String,
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ChatMessage;

    #[test]
    fn deepseek_and_groq_defaults_differ() {
        let ds = OpenAiCompatConfig::deepseek("k");
        let groq = OpenAiCompatConfig::groq("k");
        assert_eq!(ds.model, "deepseek-chat");
        assert_eq!(groq.model, "llama-3.1-8b-instant");
        assert_ne!(ds.base_url, groq.base_url);
    }

    #[test]
    fn request_leads_with_system_message() {
        let provider =
            OpenAiCompatProvider::new(OpenAiCompatConfig::groq("k")).unwrap();
        let request = CompletionRequest::new("billing system", "invoice for $500")
            .with_history(vec![ChatMessage::user("earlier")])
            .with_json_mode()
            .with_temperature(0.1);
        let wire = provider.to_wire_request(&request);

        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[0].content, "billing system");
        assert_eq!(wire.messages.last().unwrap().content, "invoice for $500");
        assert_eq!(
            wire.response_format.as_ref().unwrap().format_type,
            "json_object"
        );
        assert_eq!(wire.temperature, 0.1);
    }

    #[test]
    fn completions_url_appends_path() {
        let provider =
            OpenAiCompatProvider::new(OpenAiCompatConfig::deepseek("k")).unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://api.deepseek.com/v1/chat/completions"
        );
    }
}
