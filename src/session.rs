use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "radar_session";

/// Where authenticated users land when they open a guest-only page.
pub const HOME_PAGE: &str = "/home.html";

#[derive(Clone, Debug)]
pub struct SessionData {
    pub user_id: Uuid,
    pub apelido: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Process-local session store. Sessions do not survive a restart.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<Uuid, SessionData>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create(&self, user_id: Uuid, apelido: &str) -> Uuid {
        let now = OffsetDateTime::now_utc();
        let session_id = Uuid::new_v4();
        self.sessions.insert(
            session_id,
            SessionData {
                user_id,
                apelido: apelido.to_string(),
                created_at: now,
                expires_at: now + self.ttl,
            },
        );
        session_id
    }

    pub fn get(&self, session_id: Uuid) -> Option<SessionData> {
        self.get_at(session_id, OffsetDateTime::now_utc())
    }

    fn get_at(&self, session_id: Uuid, now: OffsetDateTime) -> Option<SessionData> {
        if let Some(cached) = self.sessions.get(&session_id) {
            if cached.expires_at > now {
                return Some(cached.clone());
            }
        }

        self.sessions.remove_if(&session_id, |_, s| s.expires_at <= now);
        None
    }

    pub fn remove(&self, session_id: Uuid) {
        self.sessions.remove(&session_id);
    }

    /// Drops expired sessions and returns how many were removed. Logins may
    /// insert concurrently, so the count is taken per entry.
    pub fn purge_expired(&self, now: OffsetDateTime) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, s| {
            let keep = s.expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Resolves the session referenced by the request cookie, if it is live.
    pub fn from_jar(&self, jar: &CookieJar) -> Option<SessionData> {
        let raw = jar.get(SESSION_COOKIE)?;
        let session_id = Uuid::parse_str(raw.value()).ok()?;
        self.get(session_id)
    }
}

/// Cookie policy: always HttpOnly; cross-site capable only in production,
/// where the app sits behind HTTPS.
pub fn session_cookie(session_id: Uuid, production: bool, ttl: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .path("/")
        .max_age(ttl)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Keeps signed-in users away from guest pages (landing, login, sign-up).
pub async fn redirect_authenticated(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    if let Some(session) = state.sessions.from_jar(&jar) {
        debug!(user_id = %session.user_id, path = %req.uri().path(), "redirecting authenticated user");
        return Redirect::to(HOME_PAGE).into_response();
    }
    next.run(req).await
}
