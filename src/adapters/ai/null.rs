//! Null provider - stands in when no API key is configured.
//!
//! Every call fails with `NotConfigured`, which the turn orchestrator
//! maps to the "assistant is not configured" copy. This lets the server
//! run keyless in development without special-casing the handlers.

use async_trait::async_trait;

use crate::ports::{CompletionError, CompletionRequest, CompletionResponse, TextCompletion};

/// TextCompletion implementation with no backing provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCompletion;

#[async_trait]
impl TextCompletion for NullCompletion {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        Err(CompletionError::NotConfigured)
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_not_configured() {
        let err = NullCompletion
            .complete(CompletionRequest::new("s", "m"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::NotConfigured));
    }
}
