use crate::db;
use crate::domain::models::Role;
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
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct BidRequest {
    pub bid_amount: Option<f64>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/open", get(open_orders))
        .route("/mine", get(my_deliveries))
        .route("/:order_id/bid", post(place_bid))
        .with_state(state)
}

/// Orders still waiting for a courier.
async fn open_orders(
    user: CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<db::Order>>, AppError> {
    if user.role != Role::DeliveryPerson {
        return Err(AppError::Forbidden);
    }
    let orders = db::open_delivery_orders(&state.pool).await?;
    Ok(Json(orders))
}

async fn my_deliveries(
    user: CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<db::Order>>, AppError> {
    if user.role != Role::DeliveryPerson {
        return Err(AppError::Forbidden);
    }
    let orders = db::orders_by_courier(&state.pool, user.id).await?;
    Ok(Json(orders))
}

async fn place_bid(
    user: CurrentUser,
    State(state): State<SharedState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<BidRequest>,
) -> Result<impl IntoResponse, AppError> {
    if user.role != Role::DeliveryPerson {
        return Err(AppError::Forbidden);
    }

    let order = db::find_order(&state.pool, order_id)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    if order.delivery_person_id.is_some() {
        return Err(AppError::conflict(
            "this order already has a delivery person assigned",
        ));
    }

    if let Some(amount) = payload.bid_amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::validation("invalid bid amount"));
        }
    }

    let inserted = db::insert_bid(&state.pool, order_id, user.id, payload.bid_amount).await?;
    if !inserted {
        return Err(AppError::conflict("you already bid on this order"));
    }

    tracing::info!(%order_id, courier = %user.id, "delivery bid placed");
    Ok(StatusCode::CREATED)
}
