//! Failover wrapper - chains a fallback provider behind the primary.
//!
//! Only transient failures (rate limit, timeout, network, 5xx) fail
//! over; authentication and request-shape errors are returned as-is
//! since the fallback would hit the same wall.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::ports::{CompletionError, CompletionRequest, CompletionResponse, TextCompletion};

/// TextCompletion wrapper with automatic failover.
pub struct FailoverCompletion {
    primary: Arc<dyn TextCompletion>,
    fallback: Option<Arc<dyn TextCompletion>>,
}

impl FailoverCompletion {
    /// Creates a wrapper around the primary provider.
    pub fn new(primary: Arc<dyn TextCompletion>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Adds a fallback provider.
    pub fn with_fallback(mut self, fallback: Arc<dyn TextCompletion>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl TextCompletion for FailoverCompletion {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        match self.primary.complete(request.clone()).await {
            Ok(response) => Ok(response),
            Err(err) if err.is_transient() => {
                let Some(fallback) = &self.fallback else {
                    return Err(err);
                };
                warn!(
                    primary = self.primary.provider_name(),
                    fallback = fallback.provider_name(),
                    %err,
                    "primary completion provider failed, trying fallback"
                );
                fallback.complete(request).await
            }
            Err(err) => Err(err),
        }
    }

    fn provider_name(&self) -> &str {
        self.primary.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockCompletion, ScriptedReply};

    fn request() -> CompletionRequest {
        CompletionRequest::new("sys", "hi")
    }

    #[tokio::test]
    async fn transient_failure_falls_over() {
        let primary = Arc::new(MockCompletion::new().with_reply(ScriptedReply::error(
            CompletionError::unavailable("down"),
        )));
        let fallback = Arc::new(MockCompletion::new().with_reply(ScriptedReply::text("rescued")));

        let provider =
            FailoverCompletion::new(primary).with_fallback(fallback.clone());
        let response = provider.complete(request()).await.unwrap();
        assert_eq!(response.content, "rescued");
        assert_eq!(fallback.call_count(), 1);
    }

    #[tokio::test]
    async fn auth_failure_does_not_fail_over() {
        let primary = Arc::new(
            MockCompletion::new()
                .with_reply(ScriptedReply::error(CompletionError::AuthenticationFailed)),
        );
        let fallback = Arc::new(MockCompletion::new().with_reply(ScriptedReply::text("nope")));

        let provider =
            FailoverCompletion::new(primary).with_fallback(fallback.clone());
        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, CompletionError::AuthenticationFailed));
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn no_fallback_returns_primary_error() {
        let primary = Arc::new(MockCompletion::new().with_reply(ScriptedReply::error(
            CompletionError::network("reset"),
        )));
        let provider = FailoverCompletion::new(primary);
        assert!(provider.complete(request()).await.is_err());
    }
}
