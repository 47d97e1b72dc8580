//! HTTP API for the call center agent.
//!
//! ## Endpoints
//!
//! - `GET /` - Liveness banner
//! - `POST /api/v1/chat` - Send a customer message, get the agent reply
//! - `POST /api/v1/transcribe` - Turn an audio upload into text
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/tools` - List available tools
//! - `GET /api/v1/sessions/:id` - Show a session's history
//! - `DELETE /api/v1/sessions/:id` - Clear a session

mod routes;
pub mod types;

use std::sync::Arc;

use crate::agent::Agent;
use crate::config::Config;
use crate::transcription::TranscriptionClient;

pub use routes::{router, AppState};

/// Build the agent from configuration and serve the API until shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let agent = Agent::from_config(&config)?;
    tracing::info!(
        model = %agent.model(),
        tools = agent.tools().len(),
        backend = %config.backend_base_url,
        "Agent ready"
    );

    let transcription = match &config.transcription_url {
        Some(url) => {
            tracing::info!(url = %url, "Transcription enabled");
            Some(TranscriptionClient::new(url.clone(), config.llm.timeout)?)
        }
        None => None,
    };

    let state = Arc::new(AppState {
        agent: Arc::new(agent),
        transcription,
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
