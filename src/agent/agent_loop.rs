//! Core agent loop implementation.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::{AgentSettings, Config};
use crate::llm::{LlmClient, LlmError, OpenAiCompatibleClient};
use crate::session::{Role, SessionStore, Turn};
use crate::tools::{default_registry, BackendClient, ToolDescription, ToolRegistry};

use super::parser::{parse_decision, Decision, ParseFailure};
use super::prompt::{build_prompt, PromptContext, ScratchStep};

/// Reply used when the model never produced a usable response.
pub const PARSE_FAILURE_REPLY: &str =
    "Üzgünüm, isteğinizi şu anda işleyemedim. Lütfen sorunuzu farklı bir şekilde tekrar yazar mısınız?";

/// Reply used when the iteration cap is hit before any tool produced output.
pub const ITERATION_LIMIT_REPLY: &str =
    "Üzgünüm, isteğinizi zamanında tamamlayamadım. Lütfen biraz sonra tekrar deneyin.";

const FORMAT_REMINDER: &str = "Önceki yanıtın beklenen biçimde değildi. Yanıtın ya \"Action:\" ve \
     \"Action Input:\" satırlarını ya da \"Final Answer:\" satırını içermeli.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("language model unavailable: {0}")]
    LlmUnavailable(#[source] LlmError),
}

/// How a chat turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Finished,
    ParseError,
    IterationExceeded,
}

impl RunOutcome {
    pub fn is_success(self) -> bool {
        self == Self::Finished
    }

    /// Machine-readable code for unsuccessful runs.
    pub fn error_code(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::ParseError => Some("parse_failure"),
            Self::IterationExceeded => Some("iteration_limit"),
        }
    }
}

/// Result of one chat turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub session_id: String,
    pub text: String,
    pub outcome: RunOutcome,
    /// Tool steps taken during the run.
    pub steps: Vec<ScratchStep>,
}

impl ChatReply {
    pub fn success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Ephemeral state of one run.
struct AgentRun<'a> {
    input: &'a str,
    history: &'a [Turn],
    scratch: Vec<ScratchStep>,
}

enum Termination {
    Finished(String),
    ParseError,
    IterationExceeded,
}

/// The customer service agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    sessions: Arc<SessionStore>,
    settings: AgentSettings,
    llm_timeout: Duration,
}

impl Agent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolRegistry>,
        sessions: Arc<SessionStore>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            llm,
            tools,
            sessions,
            settings,
            llm_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    /// Wire the production agent: HTTP model client, backend tools, empty store.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = OpenAiCompatibleClient::new(config.llm.clone())?;
        let backend =
            BackendClient::new(config.backend_base_url.clone(), config.agent.tool_timeout)?;
        let tools = default_registry(backend, config.agent.tool_timeout)?;
        let sessions = SessionStore::new(config.agent.memory_token_limit);

        Ok(Self::new(
            Arc::new(llm),
            Arc::new(tools),
            Arc::new(sessions),
            config.agent.clone(),
        )
        .with_llm_timeout(config.llm.timeout))
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Answer one customer message within a session.
    ///
    /// Requests on the same session id are serialised; the user message and
    /// the reply are appended to the history once the run ends.
    ///
    /// # Errors
    ///
    /// `AgentError::LlmUnavailable` when the model endpoint cannot be reached
    /// even after a retry. Nothing is written to the session in that case.
    pub async fn chat(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatReply, AgentError> {
        let session_id = session_id
            .unwrap_or(self.settings.default_session_id.as_str())
            .to_string();

        let handle = self.sessions.get_or_create(&session_id).await;
        let mut session = handle.lock().await;
        let history = session.snapshot();

        tracing::info!(
            session_id = %session_id,
            history_turns = history.len(),
            "Starting agent run"
        );

        let mut run = AgentRun {
            input: message,
            history: &history,
            scratch: Vec::new(),
        };
        let termination = self.drive(&mut run).await?;

        let (text, outcome) = match termination {
            Termination::Finished(text) => (text, RunOutcome::Finished),
            Termination::ParseError => (PARSE_FAILURE_REPLY.to_string(), RunOutcome::ParseError),
            Termination::IterationExceeded => {
                let text = run
                    .scratch
                    .last()
                    .map(|step| step.observation.trim())
                    .filter(|obs| !obs.is_empty())
                    .unwrap_or(ITERATION_LIMIT_REPLY)
                    .to_string();
                (text, RunOutcome::IterationExceeded)
            }
        };

        session.push(Role::User, message);
        session.push(Role::Agent, text.clone());

        tracing::info!(
            session_id = %session_id,
            outcome = ?outcome,
            steps = run.scratch.len(),
            "Agent run finished"
        );

        Ok(ChatReply {
            session_id,
            text,
            outcome,
            steps: run.scratch,
        })
    }

    async fn drive(&self, run: &mut AgentRun<'_>) -> Result<Termination, AgentError> {
        let tools: Vec<ToolDescription> = self.tools.describe_all();
        let mut reminder: Option<String> = None;
        let mut recovery_used = false;

        loop {
            if run.scratch.len() >= self.settings.max_iterations {
                tracing::warn!(
                    iterations = run.scratch.len(),
                    "Iteration limit reached"
                );
                return Ok(Termination::IterationExceeded);
            }

            let prompt = build_prompt(&PromptContext {
                tools: &tools,
                history: run.history,
                input: run.input,
                scratch: &run.scratch,
                format_reminder: reminder.as_deref(),
            });

            tracing::debug!(
                iteration = run.scratch.len() + 1,
                model = %self.llm.model(),
                "Calling language model"
            );

            let raw = match self.complete(&prompt).await {
                Ok(raw) => raw,
                Err(e) if e.is_unavailable() => {
                    if recovery_used {
                        return Err(AgentError::LlmUnavailable(e));
                    }
                    tracing::warn!(error = %e, "Language model unavailable, retrying once");
                    recovery_used = true;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Language model call failed");
                    if recovery_used {
                        return Ok(Termination::ParseError);
                    }
                    recovery_used = true;
                    reminder = Some(FORMAT_REMINDER.to_string());
                    continue;
                }
            };

            match parse_decision(&raw, &self.tools) {
                Ok(Decision::FinalAnswer { text }) => return Ok(Termination::Finished(text)),
                Ok(Decision::ToolCall {
                    tool_name,
                    raw_input,
                    thought,
                }) => {
                    let observation = match self.tools.invoke(&tool_name, &raw_input).await {
                        Ok(outcome) if outcome.terminal => {
                            return Ok(Termination::Finished(outcome.text))
                        }
                        Ok(outcome) => outcome.text,
                        Err(e) => e.to_string(),
                    };
                    run.scratch.push(ScratchStep {
                        thought,
                        action: tool_name,
                        action_input: raw_input,
                        observation,
                    });
                    reminder = None;
                }
                Err(failure) => {
                    tracing::warn!(
                        error = %failure,
                        response = %truncate(&raw, 300),
                        "Could not parse model response"
                    );
                    if recovery_used {
                        return Ok(Termination::ParseError);
                    }
                    recovery_used = true;
                    reminder = Some(reminder_for(&failure));
                }
            }
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        match tokio::time::timeout(self.llm_timeout, self.llm.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.llm_timeout.as_secs())),
        }
    }
}

fn reminder_for(failure: &ParseFailure) -> String {
    match failure {
        ParseFailure::UnknownTool(name) => format!(
            "'{}' adında bir araç yok. Yalnızca <araclar> listesindeki adları kullan \
             ya da \"Final Answer:\" ile yanıt ver.",
            name
        ),
        _ => FORMAT_REMINDER.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
