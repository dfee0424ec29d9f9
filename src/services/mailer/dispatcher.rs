use std::sync::Arc;

use async_trait::async_trait;

use crate::utils::token::Token;

use super::{EmailMessage, EmailProvider, EmailTemplates, MailError, Mailer, ProviderAck, Sender};

/// Sends account emails through a provider client built once at startup.
///
/// Failures are logged here and handed back untouched: there is no retry and
/// no deduplication, so two calls with the same token send two emails.
#[derive(Clone)]
pub struct EmailDispatcher {
    provider: Arc<dyn EmailProvider>,
    sender: Sender,
    templates: EmailTemplates,
}

impl EmailDispatcher {
    pub fn new(provider: Arc<dyn EmailProvider>, sender: Sender, templates: EmailTemplates) -> Self {
        Self {
            provider,
            sender,
            templates,
        }
    }
}

#[async_trait]
impl Mailer for EmailDispatcher {
    async fn send_email(&self, message: EmailMessage) -> Result<ProviderAck, MailError> {
        match self
            .provider
            .send_transactional(&self.sender, &message)
            .await
        {
            Ok(ack) => {
                tracing::debug!(
                    to = %message.to,
                    subject = %message.subject,
                    message_id = ?ack.message_id,
                    "Email accepted by provider"
                );
                Ok(ack)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    to = %message.to,
                    subject = %message.subject,
                    "Failed to send email through provider"
                );
                Err(err)
            }
        }
    }

    async fn send_registration_confirmation(
        &self,
        to: &str,
        token: &Token,
        apelido: &str,
    ) -> Result<ProviderAck, MailError> {
        let message = self
            .templates
            .registration_confirmation(to, token.as_str(), apelido)?;
        self.send_email(message).await
    }

    async fn send_password_reset(
        &self,
        to: &str,
        token: &Token,
    ) -> Result<ProviderAck, MailError> {
        let message = self.templates.password_reset(to, token.as_str())?;
        self.send_email(message).await
    }
}
