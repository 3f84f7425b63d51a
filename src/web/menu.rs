use crate::db;
use crate::error::AppError;
use crate::state::SharedState;
use crate::web::session::CurrentUser;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct MenuFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list))
        .route("/popular", get(popular))
        .with_state(state)
}

async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<MenuFilter>,
) -> Result<Json<Vec<db::MenuItem>>, AppError> {
    let items = db::list_menu(
        &state.pool,
        filter.search.as_deref().filter(|s| !s.is_empty()),
        filter.category.as_deref().filter(|c| !c.is_empty()),
    )
    .await?;
    Ok(Json(items))
}

/// The caller's most-ordered items across delivered orders.
async fn popular(
    user: CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<db::MenuItem>>, AppError> {
    if !user.role.is_customer() {
        return Err(AppError::Forbidden);
    }
    let items = db::most_ordered_items(&state.pool, user.id, 5).await?;
    Ok(Json(items))
}
