use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::account_token::{AccountToken, TokenPurpose};

/// Storage for emailed account tokens, keyed by digest.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Stores a new token, discarding any unused token the user already holds
    /// for the same purpose.
    async fn insert_token(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error>;

    async fn find_valid_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
        now: OffsetDateTime,
    ) -> Result<Option<AccountToken>, sqlx::Error>;

    /// Marks the token used and returns its owner. Returns `None` if the token
    /// is unknown, expired or already used.
    async fn consume_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
        now: OffsetDateTime,
    ) -> Result<Option<Uuid>, sqlx::Error>;

    /// Spends a password-reset token and stores the new password hash as one
    /// unit: either both happen or neither does. Returns the owner, or `None`
    /// when the token is not redeemable.
    async fn redeem_password_reset(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Uuid>, sqlx::Error>;

    async fn delete_token(&self, token_hash: &str) -> Result<(), sqlx::Error>;

    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64, sqlx::Error>;
}
