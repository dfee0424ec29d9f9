use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::utils::token::Token;

use super::{EmailMessage, MailError, Mailer, ProviderAck};

/// Records outgoing account emails instead of sending them.
#[derive(Debug, Default)]
pub struct MockMailer {
    pub sent_confirmations: Mutex<Vec<(String, String, String)>>,
    pub sent_resets: Mutex<Vec<(String, String)>>,
    pub sent_messages: Mutex<Vec<EmailMessage>>,
    pub fail_send: bool,
    /// Every send call, failed ones included.
    pub attempts: AtomicUsize,
}

impl MockMailer {
    pub fn failing() -> Self {
        Self {
            fail_send: true,
            ..Default::default()
        }
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn last_confirmation_token(&self) -> Option<String> {
        self.sent_confirmations
            .lock()
            .unwrap()
            .last()
            .map(|(_, token, _)| token.clone())
    }

    pub fn last_reset_token(&self) -> Option<String> {
        self.sent_resets
            .lock()
            .unwrap()
            .last()
            .map(|(_, token)| token.clone())
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_email(&self, message: EmailMessage) -> Result<ProviderAck, MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_send {
            return Err(MailError::Other("mock failure".into()));
        }
        self.sent_messages.lock().unwrap().push(message);
        Ok(ProviderAck::default())
    }

    async fn send_registration_confirmation(
        &self,
        to: &str,
        token: &Token,
        apelido: &str,
    ) -> Result<ProviderAck, MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_send {
            return Err(MailError::Other("mock failure".into()));
        }
        self.sent_confirmations.lock().unwrap().push((
            to.to_string(),
            token.as_str().to_string(),
            apelido.to_string(),
        ));
        Ok(ProviderAck::default())
    }

    async fn send_password_reset(
        &self,
        to: &str,
        token: &Token,
    ) -> Result<ProviderAck, MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_send {
            return Err(MailError::Other("mock failure".into()));
        }
        self.sent_resets
            .lock()
            .unwrap()
            .push((to.to_string(), token.as_str().to_string()));
        Ok(ProviderAck::default())
    }
}
