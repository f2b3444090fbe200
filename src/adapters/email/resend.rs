//! Resend notifier - Notifier implementation over the Resend HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::ports::{AttachmentLink, EmailMessage, Notifier, NotifyError};

/// Configuration for the Resend notifier.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    api_key: Secret<String>,
    /// "Name <address>" From header.
    pub from: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ResendConfig {
    /// Creates a new configuration.
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            from: from.into(),
            base_url: "https://api.resend.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Resend API notifier.
pub struct ResendNotifier {
    config: ResendConfig,
    client: Client,
}

impl ResendNotifier {
    /// Creates a new Resend notifier.
    pub fn new(config: ResendConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("failed to build client: {e}")))?;
        Ok(Self { config, client })
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.config.base_url)
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send_email(&self, message: EmailMessage) -> Result<(), NotifyError> {
        let html = append_attachment_links(&message.html, &message.attachment_links);

        let body = ResendRequest {
            from: self.config.from.clone(),
            to: vec![message.to],
            subject: message.subject,
            html,
        };

        let response = self
            .client
            .post(self.emails_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(NotifyError::Rejected(format!("{status}: {error_body}")))
        } else {
            Err(NotifyError::Transport(format!("{status}: {error_body}")))
        }
    }
}

/// Renders attachment links as a section under the main body.
fn append_attachment_links(html: &str, links: &[AttachmentLink]) -> String {
    if links.is_empty() {
        return html.to_string();
    }

    let items: String = links
        .iter()
        .map(|link| {
            format!(
                "<li><a href=\"{}\" style=\"color: #0070f3;\">{}</a></li>\n",
                link.url, link.file_name
            )
        })
        .collect();

    format!(
        "{html}\n<div style=\"font-family: sans-serif; max-width: 600px; \
margin: 0 auto; padding: 20px;\">\n\
<p style=\"color: #333; font-weight: bold;\">Uploaded files</p>\n\
<ul>\n{items}</ul>\n</div>"
    )
}

#[derive(Debug, Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_render_as_list_items() {
        let links = vec![
            AttachmentLink {
                file_name: "logo.png".to_string(),
                url: "https://files.example/logo.png".to_string(),
            },
            AttachmentLink {
                file_name: "brief.pdf".to_string(),
                url: "https://files.example/brief.pdf".to_string(),
            },
        ];
        let html = append_attachment_links("<div>brief</div>", &links);
        assert!(html.contains("<div>brief</div>"));
        assert!(html.contains("logo.png"));
        assert_eq!(html.matches("<li>").count(), 2);
    }

    #[test]
    fn no_links_leaves_body_untouched() {
        assert_eq!(append_attachment_links("<p>x</p>", &[]), "<p>x</p>");
    }

    #[test]
    fn emails_url_appends_path() {
        let notifier =
            ResendNotifier::new(ResendConfig::new("re_key", "SVG Agency <hi@svg.com.co>"))
                .unwrap();
        assert_eq!(notifier.emails_url(), "https://api.resend.com/emails");
    }
}
