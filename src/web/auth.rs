use crate::db;
use crate::domain::models::Role;
use crate::error::AppError;
use crate::middleware::RateLimiter;
use crate::state::SharedState;
use crate::web::session;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static LOGIN_RATE_LIMITER: Lazy<RateLimiter> = Lazy::new(|| RateLimiter::new(5, 60));

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub account_id: Uuid,
    pub username: String,
    pub role: Role,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username.trim();
    let email = payload.email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("username, email and password are required"));
    }

    // Customers self-register by default; kitchen and delivery staff may sign
    // up directly, management accounts may not.
    let role = match payload.role {
        None => Role::Customer,
        Some(r @ (Role::Customer | Role::Chef | Role::DeliveryPerson)) => r,
        Some(_) => return Err(AppError::validation("role cannot be self-assigned")),
    };

    if db::username_taken(&state.pool, username).await? {
        return Err(AppError::conflict("username already exists"));
    }
    if db::email_taken(&state.pool, &email).await? {
        return Err(AppError::conflict("email already exists"));
    }

    let salt = SaltString::generate(rand_core::OsRng);
    let hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?
        .to_string();

    let account_id = db::insert_account(&state.pool, username, &email, &hash, role).await?;
    tracing::info!(%account_id, %username, ?role, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            account_id,
            username: username.to_string(),
            role,
        }),
    ))
}

async fn login(
    headers: HeaderMap,
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let ip = client_ip(&headers);
    if !LOGIN_RATE_LIMITER.check(&ip).await {
        tracing::warn!("login rate limit exceeded for {ip}");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    let account = db::find_account_by_username(&state.pool, payload.username.trim())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !account.is_active {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let parsed_hash = PasswordHash::new(&account.hash).map_err(|_| StatusCode::UNAUTHORIZED)?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let token = session::sign_session(account.id, account.role, &state.session_key)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        axum::http::header::SET_COOKIE,
        format!("session={token}; HttpOnly; SameSite=Lax; Path=/")
            .parse()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
    );

    Ok((
        response_headers,
        Json(AuthResponse {
            account_id: account.id,
            username: account.username,
            role: account.role,
        }),
    ))
}

pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}
