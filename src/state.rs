use crate::config::Config;
use crate::db::{token_repository::TokenRepository, user_repository::UserRepository};
use crate::services::mailer::Mailer;
use crate::session::SessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}
