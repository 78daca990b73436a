use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cv_builder_api::config::Config;
use cv_builder_api::llm_client::{LlmClient, TextProvider};
use cv_builder_api::routes::build_router;
use cv_builder_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed numeric values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV builder API v{}", env!("CARGO_PKG_VERSION"));

    // One provider client for the whole process, shared by every request
    let llm = LlmClient::new(&config)?;
    if llm.is_configured() {
        info!("LLM client initialized (managed model: {})", llm.gemini_model());
    } else {
        warn!("GOOGLE_GENAI_API_KEY not set; only requests carrying their own API key will be served");
    }

    let state = AppState {
        provider: Arc::new(llm),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
