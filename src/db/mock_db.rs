use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{token_repository::TokenRepository, user_repository::UserRepository};
use crate::models::account_token::{AccountToken, TokenPurpose};
use crate::models::user::User;
use crate::utils::{password::hash_password, token::digest_token};

/// In-memory stand-in for both repositories.
#[derive(Default)]
pub struct MockDb {
    pub users: Mutex<HashMap<Uuid, User>>,
    pub tokens: Mutex<Vec<AccountToken>>,
    pub should_fail: bool,
    /// Fails only the password write of a reset, after the token lookup.
    pub fail_password_update: bool,
}

impl MockDb {
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn add_user(&self, email: &str, apelido: &str, password: &str, verified: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().insert(
            id,
            User {
                id,
                email: email.to_string(),
                apelido: apelido.to_string(),
                password_hash: hash_password(password).unwrap(),
                is_verified: verified,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        id
    }

    pub fn add_token(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        raw_token: &str,
        expires_at: OffsetDateTime,
    ) {
        self.tokens.lock().unwrap().push(AccountToken {
            id: Uuid::new_v4(),
            user_id,
            purpose,
            token_hash: digest_token(raw_token),
            expires_at,
            used_at: None,
            created_at: OffsetDateTime::now_utc(),
        });
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&user_id).cloned()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn create_user(
        &self,
        email: &str,
        apelido: &str,
        password_hash: &str,
    ) -> Result<Uuid, sqlx::Error> {
        self.check()?;
        let id = Uuid::new_v4();
        self.users.lock().unwrap().insert(
            id,
            User {
                id,
                email: email.to_string(),
                apelido: apelido.to_string(),
                password_hash: password_hash.to_string(),
                is_verified: false,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(self.user(user_id))
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        Ok(self.find_user_by_email(email).await?.is_some())
    }

    async fn is_apelido_taken(&self, apelido: &str) -> Result<bool, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|user| user.apelido.eq_ignore_ascii_case(apelido)))
    }

    async fn set_user_verified(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        self.check()?;
        if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
            user.is_verified = true;
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        self.check()?;
        self.users.lock().unwrap().remove(&user_id);
        self.tokens
            .lock()
            .unwrap()
            .retain(|token| token.user_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for MockDb {
    async fn insert_token(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        self.check()?;
        let mut tokens = self.tokens.lock().unwrap();
        tokens.retain(|t| !(t.user_id == user_id && t.purpose == purpose && t.used_at.is_none()));
        tokens.push(AccountToken {
            id: Uuid::new_v4(),
            user_id,
            purpose,
            token_hash: token_hash.to_string(),
            expires_at,
            used_at: None,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }

    async fn find_valid_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
        now: OffsetDateTime,
    ) -> Result<Option<AccountToken>, sqlx::Error> {
        self.check()?;
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash && t.purpose == purpose && t.is_redeemable(now))
            .cloned())
    }

    async fn consume_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
        now: OffsetDateTime,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        self.check()?;
        let mut tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && t.purpose == purpose && t.is_redeemable(now))
            .map(|t| {
                t.used_at = Some(now);
                t.user_id
            }))
    }

    async fn redeem_password_reset(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        self.check()?;
        let mut tokens = self.tokens.lock().unwrap();
        let Some(token) = tokens.iter_mut().find(|t| {
            t.token_hash == token_hash
                && t.purpose == TokenPurpose::PasswordReset
                && t.is_redeemable(now)
        }) else {
            return Ok(None);
        };

        if self.fail_password_update {
            return Err(sqlx::Error::Protocol("Mock password update failure".into()));
        }
        if let Some(user) = self.users.lock().unwrap().get_mut(&token.user_id) {
            user.password_hash = password_hash.to_string();
        }
        token.used_at = Some(now);
        Ok(Some(token.user_id))
    }

    async fn delete_token(&self, token_hash: &str) -> Result<(), sqlx::Error> {
        self.check()?;
        self.tokens
            .lock()
            .unwrap()
            .retain(|t| t.token_hash != token_hash);
        Ok(())
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64, sqlx::Error> {
        self.check()?;
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[tokio::test]
    async fn test_new_token_replaces_unused_one_of_same_purpose() {
        let db = MockDb::default();
        let user_id = db.add_user("a@x.com", "Ana", "segredo123", false);
        let expires = OffsetDateTime::now_utc() + Duration::hours(1);

        db.insert_token(user_id, TokenPurpose::PasswordReset, "h1", expires)
            .await
            .unwrap();
        db.insert_token(user_id, TokenPurpose::ConfirmRegistration, "h2", expires)
            .await
            .unwrap();
        db.insert_token(user_id, TokenPurpose::PasswordReset, "h3", expires)
            .await
            .unwrap();

        let now = OffsetDateTime::now_utc();
        assert!(db
            .find_valid_token("h1", TokenPurpose::PasswordReset, now)
            .await
            .unwrap()
            .is_none());
        assert!(db
            .find_valid_token("h2", TokenPurpose::ConfirmRegistration, now)
            .await
            .unwrap()
            .is_some());
        assert!(db
            .find_valid_token("h3", TokenPurpose::PasswordReset, now)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_consume_is_single_use_and_purpose_bound() {
        let db = MockDb::default();
        let user_id = db.add_user("a@x.com", "Ana", "segredo123", false);
        let now = OffsetDateTime::now_utc();
        db.insert_token(
            user_id,
            TokenPurpose::ConfirmRegistration,
            "h1",
            now + Duration::hours(1),
        )
        .await
        .unwrap();

        assert_eq!(
            db.consume_token("h1", TokenPurpose::PasswordReset, now)
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            db.consume_token("h1", TokenPurpose::ConfirmRegistration, now)
                .await
                .unwrap(),
            Some(user_id)
        );
        assert_eq!(
            db.consume_token("h1", TokenPurpose::ConfirmRegistration, now)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_delete_expired_counts_rows() {
        let db = MockDb::default();
        let user_id = db.add_user("a@x.com", "Ana", "segredo123", false);
        let now = OffsetDateTime::now_utc();
        db.add_token(user_id, TokenPurpose::PasswordReset, "old", now - Duration::minutes(1));
        db.add_token(
            user_id,
            TokenPurpose::ConfirmRegistration,
            "fresh",
            now + Duration::hours(1),
        );

        assert_eq!(db.delete_expired(now).await.unwrap(), 1);
        assert_eq!(db.token_count(), 1);
    }
}
