mod config;
mod handlers;
mod models;

use crate::config::ServerConfig;
use crate::handlers::AppState;
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use bi_agent_sdk_rs::agent::BiAgent;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub fn app(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/alive", get(handlers::alive))
        .route("/api/query", post(handlers::submit_query))
        // Everything else comes from the static front-end
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = ServerConfig::from_env()?;
    bi_agent_sdk_rs::logger::init_logging(&config.log_level);

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set. LLM features will not work.");
    }

    let agent = BiAgent::new(config.agent_config());
    let state = Arc::new(AppState::new(Arc::new(agent)));
    let app = app(state, &config.static_dir);

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    tracing::info!(
        "Server running on {} in {} mode",
        listener.local_addr()?,
        config.app_env
    );
    axum::serve(listener, app).await?;
    Ok(())
}
