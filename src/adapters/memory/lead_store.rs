//! In-memory LeadStore, plus small in-memory collaborators for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::LeadId;
use crate::domain::lead::{ConversationTurn, LeadCompleteness};
use crate::ports::{
    AttachmentError, AttachmentLink, AttachmentReader, EmailMessage, LeadStore, LeadStoreError,
    Notifier, NotifyError,
};

#[derive(Debug, Default, Clone)]
struct LeadRecord {
    transcript: Vec<ConversationTurn>,
    completeness: LeadCompleteness,
    brief: Option<String>,
    completed_marker: bool,
}

/// In-memory lead store keyed by LeadId.
///
/// The completed marker is checked-and-set under the same lock as the
/// record map, matching the atomicity the Postgres adapter gets from a
/// conditional UPDATE.
#[derive(Clone, Default)]
pub struct InMemoryLeadStore {
    leads: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a lead with an existing transcript (test convenience).
    pub async fn seed(&self, transcript: Vec<ConversationTurn>) -> LeadId {
        let lead_id = LeadId::new();
        let mut leads = self.leads.lock().unwrap();
        leads.insert(
            lead_id,
            LeadRecord {
                transcript,
                ..LeadRecord::default()
            },
        );
        lead_id
    }

    /// Current completeness of a lead (test verification).
    pub fn completeness(&self, lead_id: LeadId) -> Option<LeadCompleteness> {
        self.leads
            .lock()
            .unwrap()
            .get(&lead_id)
            .map(|r| r.completeness)
    }

    /// Stored brief for a lead (test verification).
    pub fn brief(&self, lead_id: LeadId) -> Option<String> {
        self.leads
            .lock()
            .unwrap()
            .get(&lead_id)
            .and_then(|r| r.brief.clone())
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn create_lead(&self) -> Result<LeadId, LeadStoreError> {
        let lead_id = LeadId::new();
        self.leads
            .lock()
            .unwrap()
            .insert(lead_id, LeadRecord::default());
        Ok(lead_id)
    }

    async fn append_turn(
        &self,
        lead_id: LeadId,
        turn: &ConversationTurn,
    ) -> Result<(), LeadStoreError> {
        let mut leads = self.leads.lock().unwrap();
        let record = leads
            .get_mut(&lead_id)
            .ok_or(LeadStoreError::NotFound(lead_id))?;
        record.transcript.push(turn.clone());
        Ok(())
    }

    async fn get_history(&self, lead_id: LeadId) -> Result<Vec<ConversationTurn>, LeadStoreError> {
        let leads = self.leads.lock().unwrap();
        leads
            .get(&lead_id)
            .map(|r| r.transcript.clone())
            .ok_or(LeadStoreError::NotFound(lead_id))
    }

    async fn set_brief(&self, lead_id: LeadId, brief: &str) -> Result<(), LeadStoreError> {
        let mut leads = self.leads.lock().unwrap();
        let record = leads
            .get_mut(&lead_id)
            .ok_or(LeadStoreError::NotFound(lead_id))?;
        record.brief = Some(brief.to_string());
        Ok(())
    }

    async fn set_completeness(
        &self,
        lead_id: LeadId,
        completeness: LeadCompleteness,
    ) -> Result<(), LeadStoreError> {
        let mut leads = self.leads.lock().unwrap();
        let record = leads
            .get_mut(&lead_id)
            .ok_or(LeadStoreError::NotFound(lead_id))?;
        record.completeness = completeness;
        Ok(())
    }

    async fn try_mark_completed(&self, lead_id: LeadId) -> Result<bool, LeadStoreError> {
        let mut leads = self.leads.lock().unwrap();
        let record = leads
            .get_mut(&lead_id)
            .ok_or(LeadStoreError::NotFound(lead_id))?;
        if record.completed_marker {
            return Ok(false);
        }
        record.completed_marker = true;
        record.completeness = LeadCompleteness::Complete;
        Ok(true)
    }
}

/// AttachmentReader returning a fixed list for every lead.
#[derive(Clone, Default)]
pub struct StaticAttachments {
    links: Vec<AttachmentLink>,
}

impl StaticAttachments {
    /// No attachments for any lead.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The given attachments for every lead.
    pub fn with_links(links: Vec<AttachmentLink>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl AttachmentReader for StaticAttachments {
    async fn list(&self, _lead_id: LeadId) -> Result<Vec<AttachmentLink>, AttachmentError> {
        Ok(self.links.clone())
    }
}

/// Notifier that records sent emails instead of dispatching them.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every send fail (for best-effort path tests).
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    /// Number of emails sent.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Copies of every sent email, in order.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, message: EmailMessage) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("injected failure".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_and_read_preserves_order() {
        let store = InMemoryLeadStore::new();
        let lead_id = store.create_lead().await.unwrap();

        store
            .append_turn(lead_id, &ConversationTurn::user("one"))
            .await
            .unwrap();
        store
            .append_turn(lead_id, &ConversationTurn::assistant("two", vec![]))
            .await
            .unwrap();

        let history = store.get_history(lead_id).await.unwrap();
        assert_eq!(history[0].text, "one");
        assert_eq!(history[1].text, "two");
    }

    #[tokio::test]
    async fn unknown_lead_is_not_found() {
        let store = InMemoryLeadStore::new();
        assert!(matches!(
            store.get_history(LeadId::new()).await,
            Err(LeadStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn completed_marker_wins_exactly_once() {
        let store = InMemoryLeadStore::new();
        let lead_id = store.create_lead().await.unwrap();

        assert!(store.try_mark_completed(lead_id).await.unwrap());
        assert!(!store.try_mark_completed(lead_id).await.unwrap());
        assert!(!store.try_mark_completed(lead_id).await.unwrap());
        assert_eq!(store.completeness(lead_id), Some(LeadCompleteness::Complete));
    }

    #[tokio::test]
    async fn brief_and_completeness_round_trip() {
        let store = InMemoryLeadStore::new();
        let lead_id = store.create_lead().await.unwrap();

        store.set_brief(lead_id, "the brief").await.unwrap();
        store
            .set_completeness(lead_id, LeadCompleteness::Qualified)
            .await
            .unwrap();

        assert_eq!(store.brief(lead_id).as_deref(), Some("the brief"));
        assert_eq!(
            store.completeness(lead_id),
            Some(LeadCompleteness::Qualified)
        );
    }
}
