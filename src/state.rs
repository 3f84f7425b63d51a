use crate::services::assistant::AssistantService;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub assistant: Arc<AssistantService>,
    pub session_key: Vec<u8>,
}

pub type SharedState = Arc<AppState>;
