use crate::db;
use crate::domain::escalation::{self, ReviewOutcome};
use crate::domain::models::{ReviewDecision, ReviewStatus, Role};
use crate::error::AppError;
use crate::state::SharedState;
use crate::web::session::CurrentUser;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub delivery_person_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentAction {
    Hire,
    Fire,
}

#[derive(Deserialize)]
pub struct EmploymentRequest {
    pub action: EmploymentAction,
}

#[derive(Deserialize)]
pub struct SalaryRequest {
    pub salary: f64,
}

#[derive(Serialize)]
pub struct Overview {
    pub pending_complaints: Vec<db::Complaint>,
    pub pending_compliments: Vec<db::Compliment>,
    pub unassigned_orders: Vec<db::Order>,
    pub open_bids: Vec<db::DeliveryBid>,
    pub flagged_kb_entries: Vec<db::KbEntry>,
}

#[derive(Serialize)]
pub struct StaffView {
    pub staff: Vec<db::Account>,
    pub blacklisted: Vec<db::BlacklistEntry>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/overview", get(overview))
        .route("/complaints/:id/review", post(review_complaint))
        .route("/compliments/:id/review", post(review_compliment))
        .route("/orders/:id/assign", post(assign_order))
        .route("/staff", get(staff))
        .route("/staff/:id/employment", post(set_employment))
        .route("/staff/:id/salary", post(set_salary))
        .route("/kb", get(list_kb))
        .route("/kb/:id/unflag", post(unflag_kb))
        .route("/kb/:id", delete(remove_kb))
        .with_state(state)
}

fn require_manager(user: &CurrentUser) -> Result<(), AppError> {
    if user.role != Role::Manager {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

async fn overview(
    user: CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<Overview>, AppError> {
    require_manager(&user)?;
    Ok(Json(Overview {
        pending_complaints: db::pending_complaints(&state.pool).await?,
        pending_compliments: db::pending_compliments(&state.pool).await?,
        unassigned_orders: db::open_delivery_orders(&state.pool).await?,
        open_bids: db::pending_bids(&state.pool).await?,
        flagged_kb_entries: db::flagged_kb_entries(&state.pool).await?,
    }))
}

async fn review_complaint(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(complaint_id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<StatusCode, AppError> {
    require_manager(&user)?;

    let outcome = escalation::resolve_complaint(
        &state.pool,
        complaint_id,
        payload.decision,
        payload.notes.as_deref(),
    )
    .await?;

    match outcome {
        ReviewOutcome::Reviewed => Ok(StatusCode::NO_CONTENT),
        ReviewOutcome::NotFound => Err(AppError::NotFound("complaint")),
        ReviewOutcome::AlreadyReviewed => {
            Err(AppError::conflict("complaint has already been reviewed"))
        }
    }
}

async fn review_compliment(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(compliment_id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<StatusCode, AppError> {
    require_manager(&user)?;

    let compliment = db::find_compliment(&state.pool, compliment_id)
        .await?
        .ok_or(AppError::NotFound("compliment"))?;
    if compliment.status != ReviewStatus::Pending {
        return Err(AppError::conflict("compliment has already been reviewed"));
    }

    db::mark_compliment_reviewed(
        &state.pool,
        compliment_id,
        payload.decision.status(),
        payload.decision.as_str(),
        payload.notes.as_deref(),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assigns a courier from the order's bids. The chosen bid becomes Accepted
/// and every other pending bid is rejected, atomically with the order update.
async fn assign_order(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AssignRequest>,
) -> Result<StatusCode, AppError> {
    require_manager(&user)?;

    let order = db::find_order(&state.pool, order_id)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    if order.delivery_person_id.is_some() {
        return Err(AppError::conflict("order already has a delivery person"));
    }

    let courier = db::find_account_by_id(&state.pool, payload.delivery_person_id)
        .await?
        .ok_or(AppError::NotFound("account"))?;
    if courier.role != Role::DeliveryPerson || !courier.is_active {
        return Err(AppError::validation("assignee is not an active delivery person"));
    }

    db::assign_courier(&state.pool, order_id, courier.id).await?;
    tracing::info!(%order_id, courier = %courier.id, "order assigned");
    Ok(StatusCode::NO_CONTENT)
}

async fn staff(
    user: CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<StaffView>, AppError> {
    require_manager(&user)?;
    Ok(Json(StaffView {
        staff: db::list_staff(&state.pool).await?,
        blacklisted: db::list_blacklist(&state.pool).await?,
    }))
}

async fn set_employment(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<EmploymentRequest>,
) -> Result<StatusCode, AppError> {
    require_manager(&user)?;

    let account = db::find_account_by_id(&state.pool, account_id)
        .await?
        .ok_or(AppError::NotFound("account"))?;
    if !account.role.is_staff() {
        return Err(AppError::validation("not a staff account"));
    }

    let active = matches!(payload.action, EmploymentAction::Hire);
    db::set_account_active(&state.pool, account.id, active).await?;
    tracing::info!(account = %account.username, active, "employment changed");
    Ok(StatusCode::NO_CONTENT)
}

async fn set_salary(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<SalaryRequest>,
) -> Result<StatusCode, AppError> {
    require_manager(&user)?;

    if !payload.salary.is_finite() || payload.salary < 0.0 {
        return Err(AppError::validation("invalid salary"));
    }

    let account = db::find_account_by_id(&state.pool, account_id)
        .await?
        .ok_or(AppError::NotFound("account"))?;
    db::set_account_salary(&state.pool, account.id, payload.salary).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_kb(
    user: CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<db::KbEntry>>, AppError> {
    require_manager(&user)?;
    Ok(Json(db::list_kb_entries(&state.pool).await?))
}

async fn unflag_kb(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_manager(&user)?;
    if !db::set_kb_flagged(&state.pool, entry_id, false).await? {
        return Err(AppError::NotFound("knowledge base entry"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_kb(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;
    if !db::delete_kb_entry(&state.pool, entry_id).await? {
        return Err(AppError::NotFound("knowledge base entry"));
    }
    Ok(StatusCode::NO_CONTENT)
}
