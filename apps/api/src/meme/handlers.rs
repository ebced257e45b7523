//! Axum route handlers for the meme API.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::meme::generator::generate_meme;
use crate::state::AppState;

pub const USAGE_HINT: &str = "/meme_custom?headline=Your+news+here";

#[derive(Debug, Deserialize)]
pub struct MemeQuery {
    pub headline: Option<String>,
}

/// GET /
///
/// Static descriptor: usage hint plus the template ids the bot can pick from.
pub async fn handle_index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "usage": USAGE_HINT,
        "templates": state.registry.ids(),
    }))
}

/// GET /meme_custom?headline=...
///
/// Full pipeline: LLM script → normalize → memegen URL, answered with a 302 to the image.
pub async fn handle_meme_custom(
    State(state): State<AppState>,
    Query(query): Query<MemeQuery>,
) -> Result<Response, AppError> {
    let headline = query
        .headline
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| {
            AppError::Validation("Provide a non-empty 'headline' query param.".to_string())
        })?;

    let mut rng = StdRng::from_entropy();
    let script = generate_meme(state.llm.as_ref(), &state.registry, headline, &mut rng).await?;
    let url = state.urls.script_url(&script);
    info!("Redirecting to {url}");

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}
