use crate::db;
use crate::error::AppError;
use crate::state::SharedState;
use crate::web::session::CurrentUser;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct FilingRequest {
    pub against: Uuid,
    pub order_id: Option<Uuid>,
    pub kind: Option<String>,
    pub description: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/complaints", post(file_complaint))
        .route("/complaints/mine", get(my_complaints))
        .route("/compliments", post(file_compliment))
        .with_state(state)
}

async fn file_complaint(
    user: CurrentUser,
    State(state): State<SharedState>,
    Json(payload): Json<FilingRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_filing(&state, &payload).await?;

    let id = db::insert_complaint(
        &state.pool,
        user.id,
        payload.against,
        payload.order_id,
        payload.kind.as_deref(),
        &payload.description,
    )
    .await?;

    tracing::info!(complaint = %id, filer = %user.id, "complaint filed");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "complaint_id": id })),
    ))
}

async fn my_complaints(
    user: CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<db::Complaint>>, AppError> {
    let complaints = db::complaints_by_filer(&state.pool, user.id).await?;
    Ok(Json(complaints))
}

async fn file_compliment(
    user: CurrentUser,
    State(state): State<SharedState>,
    Json(payload): Json<FilingRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_filing(&state, &payload).await?;

    let id = db::insert_compliment(
        &state.pool,
        user.id,
        payload.against,
        payload.order_id,
        payload.kind.as_deref(),
        &payload.description,
    )
    .await?;

    tracing::info!(compliment = %id, filer = %user.id, "compliment filed");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "compliment_id": id })),
    ))
}

async fn validate_filing(state: &SharedState, payload: &FilingRequest) -> Result<(), AppError> {
    if payload.description.trim().is_empty() {
        return Err(AppError::validation("a description is required"));
    }
    if db::find_account_by_id(&state.pool, payload.against)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("account"));
    }
    if let Some(order_id) = payload.order_id {
        if db::find_order(&state.pool, order_id).await?.is_none() {
            return Err(AppError::NotFound("order"));
        }
    }
    Ok(())
}
