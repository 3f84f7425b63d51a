use std::env;

use tracing::info;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_key: Vec<u8>,
    pub knowledge_base_path: String,
    pub completion_api_key: Option<String>,
    pub completion_api_url: String,
    pub seed_manager_password: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL missing"))?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{port}")
        });

        let session_key = env::var("SESSION_KEY")
            .map_err(|_| anyhow::anyhow!("SESSION_KEY missing"))?
            .into_bytes();

        let knowledge_base_path = or_default(
            "KNOWLEDGE_BASE_PATH",
            "knowledge_base/restaurant_info.txt",
        );

        let completion_api_key = env::var("COMPLETION_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let completion_api_url = or_default(
            "COMPLETION_API_URL",
            "https://api-inference.huggingface.co/models/google/flan-t5-base",
        );

        let seed_manager_password = or_default("SEED_MANAGER_PASSWORD", "manager123");

        Ok(Self {
            database_url,
            bind_addr,
            session_key,
            knowledge_base_path,
            completion_api_key,
            completion_api_url,
            seed_manager_password,
        })
    }
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}
