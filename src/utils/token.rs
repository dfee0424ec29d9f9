use std::fmt;

use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of random bytes behind every account token.
pub const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("secure random source unavailable: {0}")]
    Unavailable(#[from] rand_core::Error),
}

/// Opaque single-use credential sent by email.
///
/// Whoever presents a matching token is treated as owning the mailbox it was
/// sent to, so the raw value is never printed through `Debug` and only its
/// digest is persisted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 hex digest stored in place of the raw token.
    pub fn digest(&self) -> String {
        digest_token(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(**redacted**)")
    }
}

impl From<String> for Token {
    fn from(raw: String) -> Self {
        Token(raw)
    }
}

/// Draws `TOKEN_BYTES` bytes from the operating system CSPRNG and hex encodes
/// them (64 lowercase characters).
pub fn generate_token() -> Result<Token, TokenError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(Token(hex::encode(bytes)))
}

pub fn digest_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}
