use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        apelido: &str,
        password_hash: &str,
    ) -> Result<Uuid, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn is_apelido_taken(&self, apelido: &str) -> Result<bool, sqlx::Error>;
    async fn set_user_verified(&self, user_id: Uuid) -> Result<(), sqlx::Error>;
    async fn delete_user(&self, user_id: Uuid) -> Result<(), sqlx::Error>;
}
