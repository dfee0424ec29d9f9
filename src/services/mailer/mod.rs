use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::token::Token;

mod brevo;
mod dispatcher;
#[cfg(test)]
mod mock_mailer;
mod templates;

pub use brevo::BrevoClient;
pub use dispatcher::EmailDispatcher;
#[cfg(test)]
pub use mock_mailer::MockMailer;
pub use templates::EmailTemplates;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("Email transport error: {0}")]
    Transport(String),
    #[error("Email provider rejected the message ({status}): {body}")]
    Provider { status: u16, body: String },
    #[error("Could not render email template: {0}")]
    Template(String),
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        MailError::Transport(err.to_string())
    }
}

impl From<askama::Error> for MailError {
    fn from(err: askama::Error) -> Self {
        MailError::Template(err.to_string())
    }
}

/// Fixed identity every transactional email is sent from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// What the provider hands back for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderAck {
    pub message_id: Option<String>,
}

/// Outbound edge to a transactional email service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_transactional(
        &self,
        sender: &Sender,
        message: &EmailMessage,
    ) -> Result<ProviderAck, MailError>;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> Result<ProviderAck, MailError>;
    async fn send_registration_confirmation(
        &self,
        to: &str,
        token: &Token,
        apelido: &str,
    ) -> Result<ProviderAck, MailError>;
    async fn send_password_reset(&self, to: &str, token: &Token)
        -> Result<ProviderAck, MailError>;
}
