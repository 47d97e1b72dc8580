//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::agent::{Agent, AgentError};
use crate::transcription::{TranscriptionClient, TranscriptionError};

use super::types::{
    ChatRequest, ChatResponse, HealthResponse, MessageResponse, RootResponse, SessionResponse,
    ToolsResponse, TranscriptionResponse,
};

/// Largest accepted audio upload.
const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Shared application state.
pub struct AppState {
    pub agent: Arc<Agent>,
    pub transcription: Option<TranscriptionClient>,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/api/v1/chat", post(chat))
        .route(
            "/api/v1/transcribe",
            post(transcribe).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
        )
        .route("/api/v1/health", get(health))
        .route("/api/v1/tools", get(list_tools))
        .route(
            "/api/v1/sessions/:session_id",
            get(get_session).delete(clear_session),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "CallCenter Agent API çalışıyor!".to_string(),
        status: "active".to_string(),
    })
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message is required".to_string()));
    }

    let trace_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "chat",
        trace_id = %trace_id,
        session_id = req.session_id.as_deref().unwrap_or("")
    );

    tracing::info!(
        parent: &span,
        message_length = message.chars().count(),
        "Chat request received"
    );

    let reply = state
        .agent
        .chat(message, req.session_id.as_deref())
        .instrument(span)
        .await
        .map_err(|e| match e {
            AgentError::LlmUnavailable(_) => {
                tracing::error!(trace_id = %trace_id, error = %e, "Chat request failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Dil modeli şu anda erişilemiyor. Lütfen daha sonra tekrar deneyin.".to_string(),
                )
            }
        })?;

    Ok(Json(ChatResponse {
        success: reply.success(),
        error: reply.outcome.error_code().map(str::to_string),
        response: reply.text,
        session_id: reply.session_id,
        trace_id,
    }))
}

async fn transcribe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TranscriptionResponse>, (StatusCode, String)> {
    let Some(client) = state.transcription.as_ref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "transcription is not configured".to_string(),
        ));
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    match client.transcribe(body.to_vec(), content_type).await {
        Ok(text) => Ok(Json(TranscriptionResponse { text })),
        Err(TranscriptionError::EmptyAudio) => {
            Err((StatusCode::BAD_REQUEST, "audio body is required".to_string()))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Transcription failed");
            Err((StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        agent_status: "ready".to_string(),
        available_tools: state.agent.tools().len(),
        server_status: "running".to_string(),
        active_sessions: state.agent.sessions().len().await,
    })
}

async fn list_tools(State(state): State<Arc<AppState>>) -> Json<ToolsResponse> {
    let tools = state.agent.tools().describe_all();
    Json(ToolsResponse {
        count: tools.len(),
        tools,
    })
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    match state.agent.sessions().snapshot(&session_id).await {
        Some(turns) => Ok(Json(SessionResponse { session_id, turns })),
        None => Err((StatusCode::NOT_FOUND, "Session bulunamadı".to_string())),
    }
}

async fn clear_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    if state.agent.sessions().clear(&session_id).await {
        Ok(Json(MessageResponse {
            message: format!("Session {} konuşma geçmişi temizlendi", session_id),
        }))
    } else {
        Err((StatusCode::NOT_FOUND, "Session bulunamadı".to_string()))
    }
}
