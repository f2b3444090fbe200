//! Lead store port - persistence for lead records and transcripts.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::LeadId;
use crate::domain::lead::{ConversationTurn, LeadCompleteness};

/// Port for lead persistence.
///
/// The store owns the canonical transcript; the orchestrator only
/// appends and flags. Leads are never deleted here - that is an
/// admin-surface concern.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Creates an empty lead record and returns its id.
    async fn create_lead(&self) -> Result<LeadId, LeadStoreError>;

    /// Appends one turn to the transcript, preserving processing order.
    async fn append_turn(
        &self,
        lead_id: LeadId,
        turn: &ConversationTurn,
    ) -> Result<(), LeadStoreError>;

    /// Returns the transcript, oldest turn first.
    async fn get_history(&self, lead_id: LeadId) -> Result<Vec<ConversationTurn>, LeadStoreError>;

    /// Stores the generated executive brief.
    async fn set_brief(&self, lead_id: LeadId, brief: &str) -> Result<(), LeadStoreError>;

    /// Updates the completeness flag.
    async fn set_completeness(
        &self,
        lead_id: LeadId,
        completeness: LeadCompleteness,
    ) -> Result<(), LeadStoreError>;

    /// Atomically sets the "pipeline already triggered" marker.
    ///
    /// Returns `true` exactly once per lead - the caller that wins the
    /// check-and-set runs the completion pipeline. Every later call for
    /// the same lead returns `false`, whatever turn reported complete.
    async fn try_mark_completed(&self, lead_id: LeadId) -> Result<bool, LeadStoreError>;
}

/// Lead store errors.
#[derive(Debug, Clone, Error)]
pub enum LeadStoreError {
    /// No record for this lead id.
    #[error("lead not found: {0}")]
    NotFound(LeadId),

    /// Underlying storage failure.
    #[error("lead store failure: {0}")]
    Database(String),
}

impl LeadStoreError {
    /// Creates a database error from any storage failure.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}
