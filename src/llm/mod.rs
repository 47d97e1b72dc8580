//! Language model access.
//!
//! The agent core only needs "prompt in, text out"; providers sit behind the
//! [`LlmClient`] trait so the loop can be driven by a scripted client in tests.

mod openai;
mod scripted;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiCompatibleClient;
pub use scripted::{ScriptStep, ScriptedLlm};

/// Failure of a single completion round-trip.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion timed out after {0} seconds")]
    Timeout(u64),

    #[error("language model endpoint unreachable: {0}")]
    Unavailable(String),

    #[error("language model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid completion payload: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether the failure says something about the endpoint rather than about
    /// one particular completion.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Status { .. })
    }
}

/// A text-completion language model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier, used for logging.
    fn model(&self) -> &str;

    /// Submit a fully rendered prompt and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
