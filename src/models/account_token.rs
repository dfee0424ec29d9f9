use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    ConfirmRegistration,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::ConfirmRegistration => "confirmar_cadastro",
            TokenPurpose::PasswordReset => "redefinir_senha",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown token purpose: {0}")]
pub struct UnknownTokenPurpose(String);

impl FromStr for TokenPurpose {
    type Err = UnknownTokenPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmar_cadastro" => Ok(TokenPurpose::ConfirmRegistration),
            "redefinir_senha" => Ok(TokenPurpose::PasswordReset),
            other => Err(UnknownTokenPurpose(other.to_string())),
        }
    }
}

impl TryFrom<String> for TokenPurpose {
    type Error = UnknownTokenPurpose;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Persisted half of an emailed token. Only the digest is stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountToken {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub purpose: TokenPurpose,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
    pub used_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl AccountToken {
    pub fn is_redeemable(&self, now: OffsetDateTime) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}
