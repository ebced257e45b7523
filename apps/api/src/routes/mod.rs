pub mod health;

use axum::{routing::get, Router};

use crate::meme::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_index))
        .route("/health", get(health::health_handler))
        .route("/meme_custom", get(handlers::handle_meme_custom))
        .with_state(state)
}
