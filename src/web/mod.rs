pub mod admin;
pub mod auth;
pub mod chat;
pub mod delivery;
pub mod feedback;
pub mod menu;
pub mod orders;
pub mod session;

use crate::state::SharedState;
use axum::{routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router(state.clone()))
        .nest("/menu", menu::router(state.clone()))
        .nest("/orders", orders::router(state.clone()))
        .nest("/delivery", delivery::router(state.clone()))
        .nest("/feedback", feedback::router(state.clone()))
        .nest("/admin", admin::router(state.clone()))
        .nest("/chat", chat::router(state))
}
