// Auth HTTP routes: register, login, logout, who-am-I

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use eventola_core::validate::is_valid_email;
use eventola_storage::{hash_password, verify_password, CreateAuthSession, CreateUser, Database};

use super::{AuthConfig, SESSION_COOKIE};

const MIN_PASSWORD_LEN: usize = 8;

/// App state for auth routes
#[derive(Clone)]
pub struct AuthState {
    pub db: Arc<Database>,
    pub config: AuthConfig,
}

impl AuthState {
    pub fn new(db: Arc<Database>, config: AuthConfig) -> Self {
        Self { db, config }
    }
}

/// Request to register a new account
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    pub password: String,
}

/// Request to open a session
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/logout", post(logout))
        .route("/v1/auth/me", get(me))
        .with_state(state)
}

fn new_session_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

fn session_cookie(state: &AuthState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(state.config.cookie_secure);
    cookie.set_max_age(time::Duration::seconds(
        state.config.session_max_age.as_secs() as i64,
    ));
    cookie
}

async fn open_session(state: &AuthState, user_id: Uuid) -> anyhow::Result<String> {
    let token = new_session_token();
    let expires_at =
        Utc::now() + chrono::Duration::seconds(state.config.session_max_age.as_secs() as i64);
    state
        .db
        .create_auth_session(CreateAuthSession {
            user_id,
            token: token.clone(),
            expires_at,
        })
        .await?;
    Ok(token)
}

/// POST /v1/auth/register - Create an account and open a session
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 403, description = "Signup disabled"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>), (StatusCode, String)> {
    if state.config.disable_signup {
        return Err((StatusCode::FORBIDDEN, "Signup is disabled".to_string()));
    }
    if !is_valid_email(&req.email) {
        return Err((StatusCode::BAD_REQUEST, "Invalid email address".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    let existing = state.db.get_user_by_email(&req.email).await.map_err(|e| {
        tracing::error!("Failed to look up user: {}", e);
        internal()
    })?;
    if existing.is_some() {
        return Err((StatusCode::CONFLICT, "Email already registered".to_string()));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        internal()
    })?;

    let user = state
        .db
        .create_user(CreateUser {
            email: req.email,
            name: req.name,
            password_hash,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {}", e);
            internal()
        })?;

    let token = open_session(&state, user.id).await.map_err(|e| {
        tracing::error!("Failed to open session: {}", e);
        internal()
    })?;

    let jar = jar.add(session_cookie(&state, token));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
    ))
}

/// POST /v1/auth/login - Open a session with email and password
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = UserResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), StatusCode> {
    let user = state
        .db
        .get_user_by_email(&req.email)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let password_ok = verify_password(&req.password, &user.password_hash).map_err(|e| {
        tracing::error!("Failed to verify password: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    if !password_ok {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = open_session(&state, user.id).await.map_err(|e| {
        tracing::error!("Failed to open session: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let jar = jar.add(session_cookie(&state, token));
    Ok((
        jar,
        Json(UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
    ))
}

/// POST /v1/auth/logout - Delete the current session
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session deleted"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), StatusCode> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state
            .db
            .delete_auth_session(cookie.value())
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete session: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
    }

    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    Ok((StatusCode::NO_CONTENT, jar))
}

/// GET /v1/auth/me - Who am I
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> Result<Json<UserResponse>, StatusCode> {
    let user = super::require_user(&state.db, &jar).await?;
    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
    }))
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserializes() {
        let json = r#"{"email": "ada@example.com", "name": "Ada", "password": "hunter2hunter2"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.email, "ada@example.com");
        assert_eq!(req.name, "Ada");
    }

    #[test]
    fn test_login_request_deserializes() {
        let json = r#"{"email": "ada@example.com", "password": "hunter2hunter2"}"#;
        let req: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.email, "ada@example.com");
    }

    #[test]
    fn test_session_tokens_are_distinct_hex() {
        let a = new_session_token();
        let b = new_session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
