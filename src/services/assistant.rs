use crate::config::Config;
use crate::db;
use crate::domain::models::AnswerSource;
use crate::services::kb;
use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

/// Shown whenever the external completion call fails, whatever the cause.
pub const COMPLETION_APOLOGY: &str =
    "I'm sorry, I couldn't process your request right now. Please try again later.";

const COMPLETION_TIMEOUT: Duration = Duration::from_secs(10);

/// Answers customer-service questions: local corpus first, the external
/// completion endpoint as fallback, and a feedback loop that flags poorly
/// rated cached answers for manager review.
pub struct AssistantService {
    http: reqwest::Client,
    kb_path: String,
    api_key: Option<String>,
    api_url: String,
}

#[derive(Debug, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub source: AnswerSource,
    pub rating_id: Uuid,
}

impl AssistantService {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            kb_path: config.knowledge_base_path.clone(),
            api_key: config.completion_api_key.clone(),
            api_url: config.completion_api_url.clone(),
        })
    }

    /// Resolves a query and records the interaction for later feedback.
    /// Locally answered queries are cached as knowledge-base entries keyed by
    /// the exact query string.
    pub async fn answer(
        &self,
        pool: &PgPool,
        query: &str,
        account_id: Option<Uuid>,
    ) -> Result<ChatAnswer> {
        let local = match self.read_corpus().await {
            Some(corpus) => kb::search(&corpus, query),
            None => None,
        };

        let (answer, source) = match local {
            Some(hit) => (hit, AnswerSource::Local),
            None if self.api_key.is_some() => {
                (self.complete_remote(query).await, AnswerSource::Llm)
            }
            // No corpus hit and no endpoint configured: canned guidance,
            // still recorded as a local answer.
            None => (unconfigured_guidance(query), AnswerSource::Local),
        };

        let kb_entry_id = if source == AnswerSource::Local {
            Some(db::upsert_kb_entry(pool, query, &answer).await?.id)
        } else {
            None
        };

        let rating_id =
            db::insert_ai_rating(pool, kb_entry_id, account_id, query, &answer, source).await?;

        Ok(ChatAnswer {
            answer,
            source,
            rating_id,
        })
    }

    /// Scores a previous answer. Returns false for unknown records or values
    /// outside 0-5. A zero flags the cached entry for manager review; the
    /// entry's average is recomputed over its scored ratings either way.
    pub async fn rate(&self, pool: &PgPool, rating_id: Uuid, value: i16) -> Result<bool> {
        if !(0..=5).contains(&value) {
            return Ok(false);
        }
        let Some(record) = db::find_ai_rating(pool, rating_id).await? else {
            return Ok(false);
        };

        db::set_ai_rating_value(pool, rating_id, value).await?;

        if let Some(kb_id) = record.kb_entry_id {
            if value == 0 {
                db::set_kb_flagged(pool, kb_id, true).await?;
                tracing::info!(entry = %kb_id, "knowledge base entry flagged for review");
            }
            let (avg, count) = db::kb_positive_rating_stats(pool, kb_id).await?;
            db::update_kb_aggregate(pool, kb_id, avg, count as i32).await?;
        }

        Ok(true)
    }

    /// The corpus is re-read on every query; a missing file just means no
    /// local answers.
    async fn read_corpus(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.kb_path).await {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!("failed to read knowledge corpus {}: {e}", self.kb_path);
                None
            }
        }
    }

    async fn complete_remote(&self, query: &str) -> String {
        let Some(key) = &self.api_key else {
            return COMPLETION_APOLOGY.to_string();
        };

        let prompt =
            format!("Restaurant customer service question: {query}. Answer helpfully and concisely.");
        let payload = serde_json::json!({
            "inputs": prompt,
            "parameters": { "max_length": 200, "temperature": 0.7 }
        });

        let response = match self
            .http
            .post(&self.api_url)
            .bearer_auth(key)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("completion request failed: {e}");
                return COMPLETION_APOLOGY.to_string();
            }
        };

        match response.json::<serde_json::Value>().await {
            Ok(value) => {
                parse_completion(&value).unwrap_or_else(|| value.to_string())
            }
            Err(e) => {
                tracing::warn!("completion response was not JSON: {e}");
                COMPLETION_APOLOGY.to_string()
            }
        }
    }
}

/// Pulls the generated text out of the endpoint's known response shapes:
/// a list of objects with `generated_text`, a list of strings, or a direct
/// object carrying `generated_text` or `answer`. None means the caller
/// should fall back to stringifying the body.
fn parse_completion(value: &serde_json::Value) -> Option<String> {
    if let Some(list) = value.as_array() {
        let first = list.first()?;
        if let Some(text) = first.get("generated_text").and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
        if let Some(text) = first.as_str() {
            return Some(text.to_string());
        }
        return None;
    }
    if let Some(text) = value.get("generated_text").and_then(|v| v.as_str()) {
        return Some(text.to_string());
    }
    if let Some(text) = value.get("answer").and_then(|v| v.as_str()) {
        return Some(text.to_string());
    }
    None
}

fn unconfigured_guidance(query: &str) -> String {
    format!(
        "I couldn't find specific information about '{query}' in our knowledge base, and the \
         assistant service is not configured. You can ask me about:\n\n\
         - Our menu items and prices\n\
         - How to place orders\n\
         - Delivery information\n\
         - VIP status and benefits\n\
         - How to file complaints or compliments\n\
         - Chef ratings\n\n\
         Or contact our support team for more specific questions."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_list_of_objects() {
        let value = json!([{ "generated_text": "We close at 10pm." }]);
        assert_eq!(parse_completion(&value).as_deref(), Some("We close at 10pm."));
    }

    #[test]
    fn parses_list_of_strings() {
        let value = json!(["plain answer"]);
        assert_eq!(parse_completion(&value).as_deref(), Some("plain answer"));
    }

    #[test]
    fn parses_direct_object_shapes() {
        let generated = json!({ "generated_text": "from generated_text" });
        assert_eq!(
            parse_completion(&generated).as_deref(),
            Some("from generated_text")
        );

        let answer = json!({ "answer": "from answer" });
        assert_eq!(parse_completion(&answer).as_deref(), Some("from answer"));
    }

    #[test]
    fn unknown_shapes_yield_none() {
        assert_eq!(parse_completion(&json!({ "tokens": 12 })), None);
        assert_eq!(parse_completion(&json!([])), None);
        assert_eq!(parse_completion(&json!(42)), None);
    }

    #[test]
    fn guidance_message_names_the_query() {
        let msg = unconfigured_guidance("do you cater?");
        assert!(msg.contains("'do you cater?'"));
        assert!(msg.contains("VIP status"));
    }
}
