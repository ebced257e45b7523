use std::sync::Arc;

use crate::llm_client::ChatModel;
use crate::meme::templates::TemplateRegistry;
use crate::meme::url::MemegenUrlBuilder;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable chat model. Default: `LlmClient` against OpenAI chat completions.
    pub llm: Arc<dyn ChatModel>,
    /// Read-only template catalog, built once at startup.
    pub registry: Arc<TemplateRegistry>,
    pub urls: MemegenUrlBuilder,
}
