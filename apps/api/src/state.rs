use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerativeModel;
use crate::store::AnalysisStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Analysis persistence. Default: `PgAnalysisStore`.
    pub store: Arc<dyn AnalysisStore>,
    /// Generative model used for analysis and feedback. Default: `GeminiClient`.
    pub llm: Arc<dyn GenerativeModel>,
    pub config: Config,
}
