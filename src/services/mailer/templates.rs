use askama::Template;

use super::{EmailMessage, MailError};

pub const CONFIRMATION_SUBJECT: &str = "Confirme seu cadastro";
pub const RESET_SUBJECT: &str = "Redefinição de senha";

pub const CONFIRMATION_PATH: &str = "/tokens/token-confirmar-cadastro";
pub const RESET_PATH: &str = "/tokens/token-redefinir-senha";

#[derive(Template)]
#[template(path = "emails/confirmar_cadastro.html")]
struct ConfirmationBody<'a> {
    apelido: &'a str,
    link: &'a str,
}

#[derive(Template)]
#[template(path = "emails/redefinir_senha.html")]
struct ResetBody<'a> {
    link: &'a str,
}

/// Renders the account emails. The greeting goes through askama's HTML
/// escaping and every path segment of a link is percent-encoded, so the
/// link can be emitted verbatim.
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    base_url: String,
}

impl EmailTemplates {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn confirmation_link(&self, apelido: &str, token: &str) -> String {
        format!(
            "{}{}/{}/{}",
            self.base_url,
            CONFIRMATION_PATH,
            urlencoding::encode(apelido),
            urlencoding::encode(token)
        )
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            RESET_PATH,
            urlencoding::encode(token)
        )
    }

    pub fn registration_confirmation(
        &self,
        email: &str,
        token: &str,
        apelido: &str,
    ) -> Result<EmailMessage, MailError> {
        let link = self.confirmation_link(apelido, token);
        let html = ConfirmationBody {
            apelido,
            link: &link,
        }
        .render()?;

        Ok(EmailMessage {
            to: email.to_string(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            html,
        })
    }

    pub fn password_reset(&self, email: &str, token: &str) -> Result<EmailMessage, MailError> {
        let link = self.reset_link(token);
        let html = ResetBody { link: &link }.render()?;

        Ok(EmailMessage {
            to: email.to_string(),
            subject: RESET_SUBJECT.to_string(),
            html,
        })
    }
}
