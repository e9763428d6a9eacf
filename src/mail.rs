//! Boundary to the email-sending provider.

use crate::config::MailConfig;
use crate::contact::ContactMessage;
use async_trait::async_trait;
use log::debug;
use maud::html;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub reply_to: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    /// The provider understood the request and refused it.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Sends one email, returning the provider's response body.
    async fn send(&self, api_key: &str, email: &OutgoingEmail)
        -> Result<serde_json::Value, MailError>;
}

/// Builds the notification email for a contact form submission. All user
/// supplied text is HTML-escaped.
pub fn compose(config: &MailConfig, message: &ContactMessage) -> OutgoingEmail {
    let body = html! {
        h2 { "New Contact Form Submission" }
        p { strong { "Name:" } " " (message.name) }
        p { strong { "Email:" } " " (message.email) }
        p { strong { "Subject:" } " " (message.subject) }
        p { strong { "Message:" } }
        p { (message.message) }
    };

    OutgoingEmail {
        from: config.from.clone(),
        to: config.to.clone(),
        subject: format!("{}{}", config.subject_prefix, message.subject),
        html: body.into_string(),
        reply_to: message.email.clone(),
    }
}

#[derive(Debug, Deserialize)]
struct ResendErrorBody {
    message: String,
}

/// Resend's REST API (`POST /emails`).
pub struct ResendProvider {
    http: reqwest::Client,
    api_url: String,
}

impl ResendProvider {
    pub fn new(api_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MailProvider for ResendProvider {
    async fn send(
        &self,
        api_key: &str,
        email: &OutgoingEmail,
    ) -> Result<serde_json::Value, MailError> {
        let url = format!("{}/emails", self.api_url);
        debug!("Sending contact email via {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text)
                .map_err(|e| MailError::InvalidResponse(e.to_string()));
        }

        if status.is_client_error() {
            let message = serde_json::from_str::<ResendErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or_else(|_| format!("Provider rejected the request ({})", status));
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Err(MailError::InvalidResponse(format!("status {}", status)))
    }
}
