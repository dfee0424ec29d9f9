use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::account_token::TokenPurpose;
use crate::services::mailer::MailError;
use crate::state::AppState;
use crate::utils::token::{generate_token, Token, TokenError};

#[derive(Debug, Error)]
pub enum IssueTokenError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("could not store token: {0}")]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Mail(#[from] MailError),
}

async fn store_new_token(
    state: &AppState,
    user_id: Uuid,
    purpose: TokenPurpose,
) -> Result<Token, IssueTokenError> {
    let token = generate_token()?;
    let ttl = match purpose {
        TokenPurpose::ConfirmRegistration => state.config.confirmation_token_ttl,
        TokenPurpose::PasswordReset => state.config.reset_token_ttl,
    };
    let expires_at = OffsetDateTime::now_utc() + ttl;

    state
        .tokens
        .insert_token(user_id, purpose, &token.digest(), expires_at)
        .await?;
    Ok(token)
}

/// The token only lives as long as the email that carries it: when dispatch
/// fails the stored digest is removed again.
async fn discard_token(state: &AppState, token: &Token, purpose: TokenPurpose) {
    match state.tokens.delete_token(&token.digest()).await {
        Ok(()) => info!(%purpose, "Discarded token after failed email dispatch"),
        Err(e) => error!(%purpose, error = %e, "Failed to discard token after failed email dispatch"),
    }
}

pub async fn send_confirmation_email(
    state: &AppState,
    user_id: Uuid,
    email: &str,
    apelido: &str,
) -> Result<(), IssueTokenError> {
    let purpose = TokenPurpose::ConfirmRegistration;
    let token = store_new_token(state, user_id, purpose).await?;

    if let Err(e) = state
        .mailer
        .send_registration_confirmation(email, &token, apelido)
        .await
    {
        discard_token(state, &token, purpose).await;
        return Err(e.into());
    }
    Ok(())
}

pub async fn send_password_reset_email(
    state: &AppState,
    user_id: Uuid,
    email: &str,
) -> Result<(), IssueTokenError> {
    let purpose = TokenPurpose::PasswordReset;
    let token = store_new_token(state, user_id, purpose).await?;

    if let Err(e) = state.mailer.send_password_reset(email, &token).await {
        discard_token(state, &token, purpose).await;
        return Err(e.into());
    }
    Ok(())
}
