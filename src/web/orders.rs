use crate::db;
use crate::domain::models::{self, OrderStatus};
use crate::domain::promotion;
use crate::error::AppError;
use crate::state::SharedState;
use crate::web::session::CurrentUser;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One cart line in a checkout request. The price always comes from the menu
/// table, never from the client.
#[derive(Deserialize)]
pub struct CartLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub total_amount: f64,
    /// True when the caller is VIP after this order, newly promoted or not.
    pub vip: bool,
}

#[derive(Deserialize)]
pub struct DepositRequest {
    pub amount: f64,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub rating: i16,
    pub comment: Option<String>,
    pub menu_item_id: Option<Uuid>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/history", get(history))
        .route("/deposit", post(deposit))
        .route("/kitchen", get(kitchen))
        .route("/:id/status", post(update_status))
        .route("/:id/rate", post(rate_chef))
        .with_state(state)
}

async fn checkout(
    user: CurrentUser,
    State(state): State<SharedState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    if !user.role.is_customer() {
        return Err(AppError::Forbidden);
    }
    if db::is_blacklisted(&state.pool, user.id).await? {
        return Err(AppError::validation(
            "you are blacklisted and cannot place orders",
        ));
    }
    if payload.items.is_empty() {
        return Err(AppError::validation("your cart is empty"));
    }

    // Price every line from the menu; unknown or unavailable items abort the
    // whole checkout before anything is written.
    let mut lines = Vec::with_capacity(payload.items.len());
    let mut total = 0.0;
    for cart_line in &payload.items {
        if cart_line.quantity <= 0 {
            return Err(AppError::validation("quantities must be positive"));
        }
        let item = db::find_menu_item(&state.pool, cart_line.menu_item_id)
            .await?
            .ok_or(AppError::NotFound("menu item"))?;
        if !item.is_available {
            return Err(AppError::validation(format!(
                "{} is currently unavailable",
                item.name
            )));
        }
        let subtotal = item.price * f64::from(cart_line.quantity);
        total += subtotal;
        lines.push(db::NewOrderItem {
            menu_item_id: item.id,
            quantity: cart_line.quantity,
            subtotal,
        });
    }

    let order_id = db::place_order(
        &state.pool,
        user.id,
        &lines,
        total,
        payload.delivery_address.as_deref(),
        payload.notes.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        AppError::validation("insufficient balance, please deposit money first")
    })?;

    let vip = promotion::evaluate_and_promote(&state.pool, user.id).await?;
    tracing::info!(%order_id, customer = %user.id, total, "order placed");

    Ok(Json(CheckoutResponse {
        order_id,
        total_amount: total,
        vip,
    }))
}

async fn history(
    user: CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<db::Order>>, AppError> {
    if !user.role.is_customer() {
        return Err(AppError::Forbidden);
    }
    let orders = db::orders_by_customer(&state.pool, user.id).await?;
    Ok(Json(orders))
}

#[derive(Serialize)]
pub struct KitchenView {
    pub orders: Vec<db::Order>,
    pub average_rating: f64,
}

/// The chef's queue plus their running rating.
async fn kitchen(
    user: CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<KitchenView>, AppError> {
    if user.role != models::Role::Chef {
        return Err(AppError::Forbidden);
    }
    let orders = db::orders_for_chef(&state.pool, user.id).await?;
    let average_rating = db::chef_average_rating(&state.pool, user.id)
        .await?
        .unwrap_or(0.0);
    Ok(Json(KitchenView {
        orders,
        average_rating,
    }))
}

async fn deposit(
    user: CurrentUser,
    State(state): State<SharedState>,
    Json(payload): Json<DepositRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.is_customer() {
        return Err(AppError::Forbidden);
    }
    if !payload.amount.is_finite() || payload.amount <= 0.0 {
        return Err(AppError::validation("invalid amount"));
    }
    let balance = db::add_balance(&state.pool, user.id, payload.amount).await?;
    Ok(Json(serde_json::json!({ "balance": balance })))
}

/// Managers may set any status; chefs only while the kitchen owns the order;
/// couriers only on their own orders. Cancellation is not settable here.
async fn update_status(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> Result<StatusCode, AppError> {
    if !models::is_settable_status(payload.status) {
        return Err(AppError::validation("status cannot be set directly"));
    }

    let order = db::find_order(&state.pool, order_id)
        .await?
        .ok_or(AppError::NotFound("order"))?;

    let is_assigned_courier = order.delivery_person_id == Some(user.id);
    if !models::can_update_status(user.role, order.status, is_assigned_courier) {
        return Err(AppError::Forbidden);
    }

    db::set_order_status(&state.pool, order_id, payload.status).await?;
    tracing::info!(%order_id, status = ?payload.status, actor = %user.id, "order status updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Customers rate the chef of a delivered order they placed. The chef is
/// resolved from the order's first line item.
async fn rate_chef(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<RateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.is_customer() {
        return Err(AppError::Forbidden);
    }
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::validation("rating must be between 1 and 5"));
    }

    let order = db::find_order(&state.pool, order_id)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    if order.customer_id != user.id {
        return Err(AppError::validation("you can only rate orders you placed"));
    }
    if order.status != OrderStatus::Delivered {
        return Err(AppError::validation("you can only rate delivered orders"));
    }

    let items = db::order_items(&state.pool, order_id).await?;
    let first_item = items.first().ok_or(AppError::NotFound("order item"))?;
    let chef_id = db::find_menu_item(&state.pool, first_item.menu_item_id)
        .await?
        .and_then(|m| m.chef_id)
        .ok_or(AppError::NotFound("chef"))?;

    let rating_id = db::insert_rating(
        &state.pool,
        order_id,
        chef_id,
        user.id,
        payload.menu_item_id,
        payload.rating,
        payload.comment.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "rating_id": rating_id })),
    ))
}
