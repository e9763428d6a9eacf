use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Unknown form field: {0}")]
    UnknownField(String),
    #[error("A submission is already in progress")]
    AlreadySubmitting,
    #[error("Contact endpoint returned {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("Contact request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ContactMessage {
    pub const FIELDS: [&'static str; 4] = ["name", "email", "subject", "message"];

    /// Every field must be non-blank.
    pub fn validate(&self) -> Result<(), ContactError> {
        for field in Self::FIELDS {
            if self.field(field).map_or(true, |v| v.trim().is_empty()) {
                return Err(ContactError::MissingField(field));
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "subject" => Some(&self.subject),
            "message" => Some(&self.message),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "name" => Some(&mut self.name),
            "email" => Some(&mut self.email),
            "subject" => Some(&mut self.subject),
            "message" => Some(&mut self.message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Success,
    Error,
}

impl SubmitStatus {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Success => Some("Message sent successfully."),
            Self::Error => Some("Failed to send message. Please try again."),
        }
    }
}

/// Client-side state of the contact form. `submitting` blocks a second
/// submission until the first one finishes.
#[derive(Debug, Default)]
pub struct ContactForm {
    fields: ContactMessage,
    submitting: bool,
    status: SubmitStatus,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), ContactError> {
        let slot = self
            .fields
            .field_mut(name)
            .ok_or_else(|| ContactError::UnknownField(name.to_string()))?;
        *slot = value.into();
        Ok(())
    }

    pub fn fields(&self) -> &ContactMessage {
        &self.fields
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    /// Marks the form as submitting and hands out the payload, or `None` if a
    /// submission is already in flight.
    pub fn begin_submit(&mut self) -> Option<ContactMessage> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        self.status = SubmitStatus::Idle;
        Some(self.fields.clone())
    }

    pub fn finish<E: std::fmt::Display>(&mut self, outcome: Result<(), E>) {
        self.submitting = false;
        match outcome {
            Ok(()) => {
                self.fields = ContactMessage::default();
                self.status = SubmitStatus::Success;
            }
            Err(e) => {
                error!("Contact submission failed: {}", e);
                self.status = SubmitStatus::Error;
            }
        }
    }

    /// Runs one full submission through `client`.
    pub async fn submit(&mut self, client: &ContactClient) -> Result<SubmitStatus, ContactError> {
        let payload = self.begin_submit().ok_or(ContactError::AlreadySubmitting)?;
        let outcome = client.send(&payload).await;
        self.finish(outcome);
        Ok(self.status)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Posts contact messages to a running site's `/api/send-email`.
#[derive(Debug, Clone)]
pub struct ContactClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ContactClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/api/send-email", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
        debug!("Posting contact message to {}", self.endpoint);
        let response = self.http.post(&self.endpoint).json(message).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        Err(ContactError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
