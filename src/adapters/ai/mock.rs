//! Mock completion provider for tests.
//!
//! Scripted replies are consumed in order; errors can be injected to
//! exercise degraded paths. Requests are captured for verification.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{CompletionError, CompletionRequest, CompletionResponse, TextCompletion};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this text as the completion content.
    Success(String),
    /// Return this error.
    Failure(CompletionError),
}

impl ScriptedReply {
    /// Creates a success reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Success(content.into())
    }

    /// Creates an error reply.
    pub fn error(err: CompletionError) -> Self {
        Self::Failure(err)
    }
}

/// Mock TextCompletion with scripted replies and call capture.
#[derive(Clone, Default)]
pub struct MockCompletion {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a scripted reply.
    pub fn with_reply(self, reply: ScriptedReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Queues several scripted replies in order.
    pub fn with_replies(self, replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        self.replies.lock().unwrap().extend(replies);
        self
    }

    /// Number of completion calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Copies of every request received, in order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompletion for MockCompletion {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.calls.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::text("{\"text\":\"ok\",\"suggestions\":[]}"));

        match reply {
            ScriptedReply::Success(content) => Ok(CompletionResponse {
                content,
                model: "mock".to_string(),
            }),
            ScriptedReply::Failure(err) => Err(err),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_are_consumed_in_order() {
        let mock = MockCompletion::new()
            .with_reply(ScriptedReply::text("first"))
            .with_reply(ScriptedReply::text("second"));
        let req = CompletionRequest::new("s", "m");

        assert_eq!(mock.complete(req.clone()).await.unwrap().content, "first");
        assert_eq!(mock.complete(req).await.unwrap().content, "second");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn captures_request_content() {
        let mock = MockCompletion::new();
        let req = CompletionRequest::new("system text", "user text").with_json_mode();
        let _ = mock.complete(req).await;

        let calls = mock.calls();
        assert_eq!(calls[0].system_instruction, "system text");
        assert!(calls[0].json_mode);
    }
}
