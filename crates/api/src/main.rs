//! Wellness coach API server.

use std::sync::Arc;

use api::{AppState, Config, RemoteAuthenticator};
use coach::{ChatPipeline, GoalSuggester, PipelineConfig};
use database::Database;
use openai_assistant::OpenAiClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting coach API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Provider client, shared by chat runs and completions
    let provider = Arc::new(OpenAiClient::new(config.assistant.clone())?);
    let pipeline = ChatPipeline::new(
        db.clone(),
        provider.clone(),
        PipelineConfig::new(config.assistant.assistant_id.clone()).with_poll(config.poll),
    );
    let suggester = GoalSuggester::new(db, provider);

    let auth = RemoteAuthenticator::new(config.auth_url.clone(), config.auth_service_key.clone())?;

    // Build application state
    let state = AppState::new(pipeline, suggester, Arc::new(auth));
    let app = api::app(state);

    // Start server
    info!(addr = %config.addr, "Coach API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
