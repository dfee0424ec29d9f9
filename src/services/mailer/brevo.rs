use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{EmailMessage, EmailProvider, MailError, ProviderAck, Sender};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendResponse {
    message_id: Option<String>,
}

/// Brevo transactional email API client.
#[derive(Clone)]
pub struct BrevoClient {
    api_key: String,
    api_url: String,
    http: Client,
}

impl BrevoClient {
    pub fn new(http: &Client, api_url: &str, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            http: http.clone(),
        }
    }
}

#[async_trait]
impl EmailProvider for BrevoClient {
    async fn send_transactional(
        &self,
        sender: &Sender,
        message: &EmailMessage,
    ) -> Result<ProviderAck, MailError> {
        let payload = json!({
            "sender": {
                "email": sender.email,
                "name": sender.name
            },
            "to": [
                { "email": message.to }
            ],
            "subject": message.subject,
            "htmlContent": message.html
        });

        let resp = self
            .http
            .post(format!("{}/smtp/email", self.api_url))
            .header("api-key", &self.api_key)
            .header("accept", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        // Brevo answers 201 with {"messageId": "..."}; an empty body still
        // means the message was queued.
        let text = resp.text().await?;
        let message_id = serde_json::from_str::<BrevoSendResponse>(&text)
            .ok()
            .and_then(|parsed| parsed.message_id);

        Ok(ProviderAck { message_id })
    }
}
