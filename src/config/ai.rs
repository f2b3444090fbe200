//! AI provider configuration
//!
//! Several providers were tried over the product's life; all remain
//! configurable. The engine runs with zero keys configured - it answers
//! every turn with the "assistant is not configured" copy instead of
//! refusing to start, matching how the site behaves without a key.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// DeepSeek API key
    pub deepseek_api_key: Option<String>,

    /// Groq API key
    pub groq_api_key: Option<String>,

    /// Provider for conversational turns
    #[serde(default = "default_chat_provider")]
    pub chat_provider: AiProvider,

    /// Provider for billing extraction
    #[serde(default = "default_billing_provider")]
    pub billing_provider: AiProvider,

    /// Fallback provider for transient chat failures
    pub fallback_provider: Option<AiProvider>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Gemini,
    Deepseek,
    Groq,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the API key for a provider, if configured and non-empty.
    pub fn key_for(&self, provider: AiProvider) -> Option<&str> {
        let key = match provider {
            AiProvider::Gemini => self.gemini_api_key.as_deref(),
            AiProvider::Deepseek => self.deepseek_api_key.as_deref(),
            AiProvider::Groq => self.groq_api_key.as_deref(),
        };
        key.filter(|k| !k.is_empty())
    }

    /// Check if any provider has a key
    pub fn has_any_provider(&self) -> bool {
        [AiProvider::Gemini, AiProvider::Deepseek, AiProvider::Groq]
            .into_iter()
            .any(|p| self.key_for(p).is_some())
    }

    /// Validate AI configuration
    ///
    /// Zero keys is valid (degraded mode). With keys present, the
    /// selected providers must be among the configured ones.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_any_provider() {
            return Ok(());
        }
        if self.key_for(self.chat_provider).is_none() {
            return Err(ValidationError::ProviderKeyMissing);
        }
        if self.key_for(self.billing_provider).is_none() {
            return Err(ValidationError::ProviderKeyMissing);
        }
        if let Some(fallback) = self.fallback_provider {
            if self.key_for(fallback).is_none() {
                return Err(ValidationError::ProviderKeyMissing);
            }
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            deepseek_api_key: None,
            groq_api_key: None,
            chat_provider: default_chat_provider(),
            billing_provider: default_billing_provider(),
            fallback_provider: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_provider() -> AiProvider {
    AiProvider::Gemini
}

fn default_billing_provider() -> AiProvider {
    AiProvider::Groq
}

fn default_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_keys_is_valid_degraded_mode() {
        let config = AiConfig::default();
        assert!(!config.has_any_provider());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn chat_provider_without_key_rejected() {
        let config = AiConfig {
            groq_api_key: Some("gsk_x".to_string()),
            // chat_provider defaults to Gemini, which has no key
            billing_provider: AiProvider::Groq,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn matching_keys_accepted() {
        let config = AiConfig {
            gemini_api_key: Some("g_x".to_string()),
            groq_api_key: Some("gsk_x".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_string_key_counts_as_absent() {
        let config = AiConfig {
            gemini_api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(!config.has_any_provider());
    }

    #[test]
    fn fallback_needs_a_key_too() {
        let config = AiConfig {
            gemini_api_key: Some("g_x".to_string()),
            groq_api_key: Some("gsk_x".to_string()),
            fallback_provider: Some(AiProvider::Deepseek),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
