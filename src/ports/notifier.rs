//! Notifier port - outbound email dispatch.

use async_trait::async_trait;
use thiserror::Error;

use super::AttachmentLink;

/// An email ready to send.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    /// Links to uploaded files, rendered into the body by the adapter.
    pub attachment_links: Vec<AttachmentLink>,
}

/// Port for dispatching notification emails.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> Result<(), NotifyError>;
}

/// Notification errors.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("email provider rejected the message: {0}")]
    Rejected(String),

    #[error("email dispatch failed: {0}")]
    Transport(String),
}
