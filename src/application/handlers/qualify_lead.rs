//! QualifyLeadHandler - the completion pipeline.
//!
//! Runs once per lead, after the orchestrator wins the completed-marker
//! check-and-set. Generates the executive brief from the full
//! transcript, persists it, flips completeness to `qualified`, and
//! notifies the team by email. Every step is best-effort: failures are
//! logged and swallowed, never propagated back to a turn the user has
//! already received.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::foundation::LeadId;
use crate::domain::lead::{brief_instruction, render_transcript, LeadCompleteness};
use crate::ports::{
    AttachmentReader, CompletionRequest, EmailMessage, LeadStore, Notifier, TextCompletion,
};

/// Handler for the one-time lead qualification pipeline.
#[derive(Clone)]
pub struct QualifyLeadHandler {
    completion: Arc<dyn TextCompletion>,
    store: Arc<dyn LeadStore>,
    attachments: Arc<dyn AttachmentReader>,
    notifier: Arc<dyn Notifier>,
    /// Internal recipient for new-lead notifications.
    notify_to: String,
}

impl QualifyLeadHandler {
    pub fn new(
        completion: Arc<dyn TextCompletion>,
        store: Arc<dyn LeadStore>,
        attachments: Arc<dyn AttachmentReader>,
        notifier: Arc<dyn Notifier>,
        notify_to: impl Into<String>,
    ) -> Self {
        Self {
            completion,
            store,
            attachments,
            notifier,
            notify_to: notify_to.into(),
        }
    }

    /// Runs the pipeline for a lead whose closing turn just landed.
    ///
    /// Infallible by design: the user-facing turn has already been
    /// returned, so there is nothing useful to propagate. Each step
    /// failure is logged with the lead id and the rest continue where
    /// that still makes sense.
    pub async fn run(&self, lead_id: LeadId) {
        let transcript = match self.store.get_history(lead_id).await {
            Ok(turns) if !turns.is_empty() => turns,
            Ok(_) => {
                warn!(%lead_id, "completion pipeline invoked on empty transcript, skipping");
                return;
            }
            Err(err) => {
                error!(%lead_id, %err, "failed to load transcript for brief generation");
                return;
            }
        };

        let links = match self.attachments.list(lead_id).await {
            Ok(links) => links,
            Err(err) => {
                warn!(%lead_id, %err, "attachment lookup failed, brief will omit assets");
                Vec::new()
            }
        };
        let file_names: Vec<String> = links.iter().map(|l| l.file_name.clone()).collect();

        // Second completion call: deterministic-leaning extraction.
        let request = CompletionRequest::new(
            brief_instruction(&file_names),
            render_transcript(&transcript),
        )
        .with_temperature(0.2)
        .with_max_tokens(1024);

        let brief = match self.completion.complete(request).await {
            Ok(response) => response.content,
            Err(err) => {
                error!(%lead_id, %err, "brief generation failed");
                return;
            }
        };

        if let Err(err) = self.store.set_brief(lead_id, &brief).await {
            error!(%lead_id, %err, "failed to persist brief");
        }
        if let Err(err) = self
            .store
            .set_completeness(lead_id, LeadCompleteness::Qualified)
            .await
        {
            error!(%lead_id, %err, "failed to flip lead to qualified");
        }

        let email = EmailMessage {
            to: self.notify_to.clone(),
            subject: format!("New qualified lead {lead_id}"),
            html: brief_html(&brief),
            attachment_links: links,
        };
        match self.notifier.send_email(email).await {
            Ok(()) => info!(%lead_id, "qualified lead notification sent"),
            Err(err) => error!(%lead_id, %err, "lead notification email failed"),
        }
    }
}

/// Renders the plain-text brief as simple HTML for the email body.
fn brief_html(brief: &str) -> String {
    let mut lines = String::new();
    for line in brief.lines() {
        if line.trim().is_empty() {
            continue;
        }
        lines.push_str(&format!(
            "<p style=\"color: #666; line-height: 1.6; margin: 4px 0;\">{}</p>\n",
            escape_html(line)
        ));
    }
    format!(
        "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto; \
padding: 20px; border: 1px solid #eee; border-radius: 10px;\">\n\
<h2 style=\"color: #333;\">New qualified lead</h2>\n{lines}</div>"
    )
}

/// Minimal HTML escaping for text interpolated into the email body.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brief_html_wraps_each_line() {
        let html = brief_html("- Client Name: Jane Doe\n- Budget Indicators: Not provided");
        assert!(html.contains("<h2"));
        assert!(html.contains("Jane Doe"));
        assert!(html.contains("Not provided"));
        assert_eq!(html.matches("<p ").count(), 2);
    }

    #[test]
    fn brief_html_escapes_markup() {
        let html = brief_html("- Scope: <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
