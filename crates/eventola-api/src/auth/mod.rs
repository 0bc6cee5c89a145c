// Authentication module
// Decision: Cookie-based sessions for the dashboard UI
// Decision: Opaque random tokens stored server-side, not JWTs

pub mod config;
pub mod routes;

use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use eventola_storage::{Database, UserRow};

pub use config::AuthConfig;
pub use routes::{routes, AuthState};

/// Name of the session cookie issued on login
pub const SESSION_COOKIE: &str = "eventola_session";

/// Resolve the caller from the session cookie, if any
pub async fn current_user(db: &Database, jar: &CookieJar) -> anyhow::Result<Option<UserRow>> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let Some(session) = db.get_auth_session(cookie.value()).await? else {
        return Ok(None);
    };

    db.get_user(session.user_id).await
}

/// Resolve the caller or reject with 401
pub async fn require_user(db: &Database, jar: &CookieJar) -> Result<UserRow, StatusCode> {
    current_user(db, jar)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve session: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)
}
