use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub apelido: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Deserialize, Serialize)]
pub struct SignupPayload {
    pub email: String,
    pub apelido: String,
    pub senha: String,
}

#[derive(Deserialize, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub senha: String,
}

#[derive(Deserialize, Serialize)]
pub struct EmailPayload {
    pub email: String,
}

/// Emails are compared case-insensitively everywhere.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The apelido travels as a path segment of the confirmation link. A segment
/// made only of dots (even percent-encoded) is resolved away by URL parsers.
pub fn is_acceptable_apelido(apelido: &str) -> bool {
    !apelido.is_empty() && !apelido.chars().all(|c| c == '.')
}
