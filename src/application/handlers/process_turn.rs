//! ProcessTurnHandler - the turn orchestrator.
//!
//! Single entry point per user message: composes the dialogue policy
//! with attachment context and prior history, makes exactly one
//! completion call, repairs the output against the structured contract,
//! appends both turns, and triggers the completion pipeline the first
//! time a lead reports complete.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::foundation::LeadId;
use crate::domain::lead::{
    attachment_context, policy_instruction, ConversationTurn, StructuredResponse, TurnRole,
    TurnStatus, FALLBACK_TEXT, NOT_CONFIGURED_TEXT,
};
use crate::ports::{
    AttachmentReader, ChatMessage, CompletionError, CompletionRequest, LeadStore, TextCompletion,
};

use super::QualifyLeadHandler;

/// Command to process one user message.
#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub lead_id: LeadId,
    pub message: String,
    /// Prior transcript as the caller saw it, oldest first.
    pub history: Vec<ConversationTurn>,
}

/// Result of processing a turn.
#[derive(Debug)]
pub struct ProcessTurnResult {
    /// The validated (possibly repaired or degraded) assistant turn.
    pub response: StructuredResponse,
    /// Background pipeline task, present only on the turn that won the
    /// completed-marker check-and-set. The HTTP layer drops this handle
    /// (fire-and-forget); tests await it.
    pub pipeline: Option<JoinHandle<()>>,
}

/// Errors surfaced to the caller.
///
/// Deliberately small: provider failures and schema drift are absorbed
/// into degraded responses, never surfaced here.
#[derive(Debug, Clone, Error)]
pub enum ProcessTurnError {
    /// Empty message, rejected before any external call.
    #[error("message must not be empty")]
    EmptyMessage,
}

/// Handler for conversational turns.
pub struct ProcessTurnHandler {
    completion: Arc<dyn TextCompletion>,
    store: Arc<dyn LeadStore>,
    attachments: Arc<dyn AttachmentReader>,
    pipeline: QualifyLeadHandler,
}

impl ProcessTurnHandler {
    pub fn new(
        completion: Arc<dyn TextCompletion>,
        store: Arc<dyn LeadStore>,
        attachments: Arc<dyn AttachmentReader>,
        pipeline: QualifyLeadHandler,
    ) -> Self {
        Self {
            completion,
            store,
            attachments,
            pipeline,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessTurnCommand,
    ) -> Result<ProcessTurnResult, ProcessTurnError> {
        let message = cmd.message.trim();
        if message.is_empty() {
            return Err(ProcessTurnError::EmptyMessage);
        }

        // Side-context: uploaded reference files fold into the system
        // instruction, never into the transcript.
        let file_names = match self.attachments.list(cmd.lead_id).await {
            Ok(links) => links.into_iter().map(|l| l.file_name).collect::<Vec<_>>(),
            Err(err) => {
                warn!(lead_id = %cmd.lead_id, %err, "attachment lookup failed, continuing without context");
                Vec::new()
            }
        };
        let context = attachment_context(&file_names);
        let instruction = policy_instruction(context.as_deref());

        let history = cmd
            .history
            .iter()
            .map(|turn| match turn.role {
                TurnRole::User => ChatMessage::user(turn.text.clone()),
                TurnRole::Assistant => ChatMessage::assistant(turn.text.clone()),
            })
            .collect();

        let request = CompletionRequest::new(instruction, message)
            .with_history(history)
            .with_json_mode()
            .with_temperature(0.7)
            .with_max_tokens(1024);

        // Exactly one completion call per turn. Failures degrade; they
        // never crash the conversation.
        let response = match self.completion.complete(request).await {
            Ok(raw) => StructuredResponse::parse(&raw.content),
            Err(CompletionError::NotConfigured) => {
                warn!(lead_id = %cmd.lead_id, "no completion provider configured");
                StructuredResponse::degraded(NOT_CONFIGURED_TEXT)
            }
            Err(err) => {
                warn!(lead_id = %cmd.lead_id, %err, "completion call failed, returning fallback turn");
                StructuredResponse::degraded(FALLBACK_TEXT)
            }
        };

        self.append_transcript(cmd.lead_id, message, &response).await;

        let pipeline = if response.status == TurnStatus::Complete {
            self.trigger_pipeline(cmd.lead_id).await
        } else {
            None
        };

        Ok(ProcessTurnResult { response, pipeline })
    }

    /// Appends the user and assistant turns, in that order.
    ///
    /// Append failures are logged and swallowed: the assistant turn has
    /// already been generated and the user gets it either way.
    async fn append_transcript(
        &self,
        lead_id: LeadId,
        message: &str,
        response: &StructuredResponse,
    ) {
        let user_turn = ConversationTurn::user(message);
        if let Err(err) = self.store.append_turn(lead_id, &user_turn).await {
            error!(%lead_id, %err, "failed to append user turn");
        }

        let assistant_turn =
            ConversationTurn::assistant(response.text.clone(), response.suggestions.clone());
        if let Err(err) = self.store.append_turn(lead_id, &assistant_turn).await {
            error!(%lead_id, %err, "failed to append assistant turn");
        }
    }

    /// Fires the completion pipeline if this lead has not triggered it yet.
    ///
    /// Dedup is keyed on the lead id via an atomic check-and-set in the
    /// store, so a lead flip-flopping `complete` across turns still gets
    /// exactly one brief and one email.
    async fn trigger_pipeline(&self, lead_id: LeadId) -> Option<JoinHandle<()>> {
        match self.store.try_mark_completed(lead_id).await {
            Ok(true) => {
                info!(%lead_id, "lead complete, scheduling qualification pipeline");
                let pipeline = self.pipeline.clone();
                Some(tokio::spawn(async move { pipeline.run(lead_id).await }))
            }
            Ok(false) => {
                debug!(%lead_id, "lead already qualified, skipping pipeline");
                None
            }
            Err(err) => {
                error!(%lead_id, %err, "completed-marker check failed, skipping pipeline");
                None
            }
        }
    }
}
