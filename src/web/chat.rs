use crate::error::AppError;
use crate::middleware::RateLimiter;
use crate::services::assistant::ChatAnswer;
use crate::state::SharedState;
use crate::web::{auth, session};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use uuid::Uuid;

static CHAT_RATE_LIMITER: Lazy<RateLimiter> = Lazy::new(|| RateLimiter::new(10, 60));

#[derive(Deserialize)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub rating: i16,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/rate/:rating_id", post(rate))
        .with_state(state)
}

/// Open to visitors; an authenticated session just attributes the question.
async fn ask(
    headers: HeaderMap,
    State(state): State<SharedState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<ChatAnswer>, AppError> {
    let ip = auth::client_ip(&headers);
    if !CHAT_RATE_LIMITER.check(&ip).await {
        tracing::warn!("chat rate limit exceeded for {ip}");
        return Err(AppError::RateLimited);
    }

    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::validation("a question is required"));
    }

    let account_id = session::optional_account_id(&headers, &state.session_key);
    let answer = state.assistant.answer(&state.pool, query, account_id).await?;
    Ok(Json(answer))
}

async fn rate(
    State(state): State<SharedState>,
    Path(rating_id): Path<Uuid>,
    Json(payload): Json<RateRequest>,
) -> Result<StatusCode, AppError> {
    let accepted = state
        .assistant
        .rate(&state.pool, rating_id, payload.rating)
        .await?;
    if !accepted {
        return Err(AppError::validation("invalid rating"));
    }
    Ok(StatusCode::NO_CONTENT)
}
