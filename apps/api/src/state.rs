use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::GeminiClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// `None` when no API key is configured: the chat endpoints then
    /// answer with a fixed unavailable message instead of failing.
    pub llm: Option<GeminiClient>,
    pub config: Config,
}
