use sqlx::PgPool;
use tracing::info;

const CREATE_USUARIO: &str = r#"
CREATE TABLE IF NOT EXISTS usuario (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email TEXT NOT NULL UNIQUE,
    apelido TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    is_verified BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_USUARIO_APELIDO_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS usuario_apelido_lower_idx ON usuario (lower(apelido))
"#;

const CREATE_ACCOUNT_TOKENS: &str = r#"
CREATE TABLE IF NOT EXISTS account_tokens (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES usuario (id) ON DELETE CASCADE,
    purpose TEXT NOT NULL,
    token_hash TEXT NOT NULL UNIQUE,
    expires_at TIMESTAMPTZ NOT NULL,
    used_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_ACCOUNT_TOKENS_USER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS account_tokens_user_purpose_idx ON account_tokens (user_id, purpose)
"#;

/// Creates the tables this service owns if they do not exist yet.
pub async fn create_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in [
        CREATE_USUARIO,
        CREATE_USUARIO_APELIDO_INDEX,
        CREATE_ACCOUNT_TOKENS,
        CREATE_ACCOUNT_TOKENS_USER_INDEX,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Tables checked/created");
    Ok(())
}
