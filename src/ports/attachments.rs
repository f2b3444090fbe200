//! Attachment reader port - read-only view of files a lead uploaded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::LeadId;

/// A previously uploaded reference file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentLink {
    pub file_name: String,
    pub url: String,
}

/// Port for listing a lead's uploaded files.
///
/// Upload mechanics live elsewhere; the engine only folds file names
/// into the dialogue context and links them into the notification email.
#[async_trait]
pub trait AttachmentReader: Send + Sync {
    /// Lists attachments for a lead, upload order preserved.
    async fn list(&self, lead_id: LeadId) -> Result<Vec<AttachmentLink>, AttachmentError>;
}

/// Attachment lookup errors.
#[derive(Debug, Clone, Error)]
pub enum AttachmentError {
    #[error("attachment lookup failed: {0}")]
    Lookup(String),
}
