use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::user_repository::UserRepository;
use crate::models::user::User;

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(
        &self,
        email: &str,
        apelido: &str,
        password_hash: &str,
    ) -> Result<Uuid, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO usuario (email, apelido, password_hash, is_verified, created_at)
            VALUES ($1, $2, $3, false, now())
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(apelido)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, apelido, password_hash, is_verified, created_at
            FROM usuario
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, apelido, password_hash, is_verified, created_at
            FROM usuario
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        let res: Option<i32> = sqlx::query_scalar("SELECT 1 FROM usuario WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(res.is_some())
    }

    async fn is_apelido_taken(&self, apelido: &str) -> Result<bool, sqlx::Error> {
        let res: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM usuario WHERE lower(apelido) = lower($1)")
                .bind(apelido)
                .fetch_optional(&self.pool)
                .await?;
        Ok(res.is_some())
    }

    async fn set_user_verified(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE usuario SET is_verified = true WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM usuario WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
