use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Model id the generator sends with every request.
    pub model: String,
    pub templates: usize,
}

/// GET /health
///
/// Liveness plus the wiring the process started with. Never calls the model.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        service: "newsmeme-api",
        version: env!("CARGO_PKG_VERSION"),
        model: state.llm.model().to_string(),
        templates: state.registry.len(),
    })
}
