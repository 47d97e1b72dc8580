//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::session::Turn;
use crate::tools::ToolDescription;

/// Request to send one customer message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The customer's message
    pub message: String,

    /// Conversation to continue (server default if not specified)
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Agent reply to one message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// Text shown to the customer
    pub response: String,

    /// Whether the agent reached a real answer
    pub success: bool,

    /// `parse_failure` or `iteration_limit` when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Session the turn was recorded in
    pub session_id: String,

    /// Correlation id of this request in the logs
    pub trace_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent_status: String,
    pub available_tools: usize,
    pub server_status: String,
    pub active_sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDescription>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}
