use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use time::Duration;

use crate::services::mailer::Sender;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_BREVO_API_URL: &str = "https://api.brevo.com/v3";
pub const DEFAULT_SENDER_EMAIL: &str = "radarpraiagrande2025@gmail.com";
pub const DEFAULT_SENDER_NAME: &str = "Radar Praia Grande";
pub const DEFAULT_CONFIRMATION_TOKEN_TTL_HOURS: i64 = 24;
pub const DEFAULT_RESET_TOKEN_TTL_MINUTES: i64 = 30;
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub brevo_api_key: String,
    pub brevo_api_url: String,
    pub sender: Sender,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Public origin used when building links that go out by email.
    pub base_url: String,
    pub production: bool,
    pub public_dir: PathBuf,
    pub views_dir: PathBuf,
    pub email: EmailSettings,
    pub confirmation_token_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let database_url = required("DATABASE_URL")?;
        let brevo_api_key = required("BREVO_API_KEY")?;

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let positive = |key: &'static str, default: i64| -> Result<i64, ConfigError> {
            match get(key) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|v| *v > 0)
                    .ok_or_else(|| ConfigError::Invalid {
                        key,
                        value: raw.clone(),
                    }),
            }
        };

        let production = get("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Ok(Config {
            database_url,
            bind_addr,
            base_url: get("APP_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            production,
            public_dir: get("PUBLIC_DIR")
                .unwrap_or_else(|| "public".into())
                .into(),
            views_dir: get("VIEWS_DIR").unwrap_or_else(|| "view".into()).into(),
            email: EmailSettings {
                brevo_api_key,
                brevo_api_url: get("BREVO_API_URL")
                    .unwrap_or_else(|| DEFAULT_BREVO_API_URL.to_string()),
                sender: Sender {
                    email: get("EMAIL_SENDER_ADDRESS")
                        .unwrap_or_else(|| DEFAULT_SENDER_EMAIL.to_string()),
                    name: get("EMAIL_SENDER_NAME")
                        .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
                },
            },
            confirmation_token_ttl: Duration::hours(positive(
                "CONFIRMATION_TOKEN_TTL_HOURS",
                DEFAULT_CONFIRMATION_TOKEN_TTL_HOURS,
            )?),
            reset_token_ttl: Duration::minutes(positive(
                "RESET_TOKEN_TTL_MINUTES",
                DEFAULT_RESET_TOKEN_TTL_MINUTES,
            )?),
            session_ttl: Duration::minutes(positive(
                "SESSION_TTL_MINUTES",
                DEFAULT_SESSION_TTL_MINUTES,
            )?),
        })
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/radar_test".into()),
        "BREVO_API_KEY" => Some("test-key".into()),
        _ => None,
    })
    .expect("test config should parse")
}
