use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use newsmeme::config::Config;
use newsmeme::llm_client::{ChatModel, LlmClient};
use newsmeme::meme::templates::TemplateRegistry;
use newsmeme::meme::url::MemegenUrlBuilder;
use newsmeme::routes::build_router;
use newsmeme::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{pkg}={level},tower_http={level}",
                pkg = env!("CARGO_PKG_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting News Meme API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::with_base_url(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let registry = TemplateRegistry::builtin();
    info!("Template registry loaded: {:?}", registry.ids());

    // Build app state
    let state = AppState {
        llm: Arc::new(llm),
        registry: Arc::new(registry),
        urls: MemegenUrlBuilder::new(&config.memegen_base_url),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
