//! DraftInvoiceHandler - single-shot invoice extraction.
//!
//! No conversation to protect here: unrepairable output is surfaced to
//! the caller so they can rephrase the prompt.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::domain::invoice::{billing_instruction, DraftParseError, InvoiceDraft};
use crate::ports::{CompletionError, CompletionRequest, TextCompletion};

/// Command carrying the free-text billing prompt.
#[derive(Debug, Clone)]
pub struct DraftInvoiceCommand {
    pub prompt: String,
}

/// Invoice drafting errors.
#[derive(Debug, Clone, Error)]
pub enum DraftInvoiceError {
    /// Empty prompt, rejected before any external call.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// The completion service itself failed.
    #[error("billing assistant unavailable: {0}")]
    Provider(#[from] CompletionError),

    /// Output could not be recovered into the items/client shape.
    #[error(transparent)]
    Extraction(#[from] DraftParseError),
}

/// Handler for the invoice-drafting assistant.
pub struct DraftInvoiceHandler {
    completion: Arc<dyn TextCompletion>,
}

impl DraftInvoiceHandler {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    pub async fn handle(
        &self,
        cmd: DraftInvoiceCommand,
    ) -> Result<InvoiceDraft, DraftInvoiceError> {
        let prompt = cmd.prompt.trim();
        if prompt.is_empty() {
            return Err(DraftInvoiceError::EmptyPrompt);
        }

        let request = CompletionRequest::new(billing_instruction(), prompt)
            .with_json_mode()
            .with_temperature(0.1)
            .with_max_tokens(1024);

        let response = self.completion.complete(request).await?;

        InvoiceDraft::parse(&response.content).map_err(|err| {
            warn!(%err, raw = %response.content, "invoice extraction failed");
            err.into()
        })
    }
}
