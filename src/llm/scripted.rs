//! Deterministic language model driven by scripted replies.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{LlmClient, LlmError};

/// One scripted completion.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this text.
    Text(String),
    /// Fail as if the endpoint were unreachable.
    Unavailable,
    /// Sleep, then return the text. Used to exercise call timeouts.
    Delayed(Duration, String),
}

/// A [`LlmClient`] that replays a fixed script and records every prompt.
///
/// Once the script is exhausted each call fails with
/// [`LlmError::InvalidResponse`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedLlm {
    script: Arc<Mutex<VecDeque<ScriptStep>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLlm {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into())),
            prompts: Arc::default(),
        }
    }

    /// Script made only of text replies.
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            replies
                .into_iter()
                .map(|r| ScriptStep::Text(r.into()))
                .collect(),
        )
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn next_step(&self, prompt: &str) -> Option<ScriptStep> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.script.lock().ok()?.pop_front()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        match self.next_step(prompt) {
            Some(ScriptStep::Text(text)) => Ok(text),
            Some(ScriptStep::Unavailable) => {
                Err(LlmError::Unavailable("connection refused".to_string()))
            }
            Some(ScriptStep::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Err(LlmError::InvalidResponse("script exhausted".to_string())),
        }
    }
}
