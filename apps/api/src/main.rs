mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod notify;
mod routes;
mod schema;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::generator::Pipeline;
use crate::generation::orchestrator::Deadlines;
use crate::llm_client::GeminiClient;
use crate::models::tier::{ModelTier, TierLadder};
use crate::notify::WebhookNotifier;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values; a missing API key is allowed)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lounge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the upstream client. The transport timeout only backs up the pipeline deadline.
    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.pipeline_timeout,
    )?;
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; every generation request will fail with a configuration error");
    }

    let ladder = TierLadder::new(
        ModelTier::fast(config.fast_model.clone()),
        ModelTier::robust(config.robust_model.clone()),
    );
    info!(
        "Tier ladder: fast={} robust={} (attempt {}s, pipeline {}s)",
        config.fast_model,
        config.robust_model,
        config.attempt_timeout.as_secs(),
        config.pipeline_timeout.as_secs()
    );

    let pipeline = Pipeline::new(
        Arc::new(gemini),
        ladder,
        Deadlines {
            per_attempt: config.attempt_timeout,
            total: config.pipeline_timeout,
        },
    );

    let notifier = WebhookNotifier::new(config.notify_webhook_url.clone());
    if notifier.is_enabled() {
        info!("Parse notifications enabled");
    }

    // Build app state
    let state = AppState {
        pipeline,
        notifier,
        config: config.clone(),
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
