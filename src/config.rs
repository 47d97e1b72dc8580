//! Configuration management for the call center agent.
//!
//! Configuration can be set via environment variables:
//! - `LLM_BASE_URL` - Optional. OpenAI-compatible endpoint. Defaults to `http://localhost:1234/v1`.
//! - `LLM_API_KEY` - Optional. Bearer token for the endpoint. Defaults to `lm-studio`.
//! - `LLM_MODEL` - Optional. Model identifier. Defaults to `google/gemma-3-12b`.
//! - `LLM_TEMPERATURE` - Optional. Sampling temperature. Defaults to `0.0`.
//! - `LLM_TIMEOUT_SECS` - Optional. Per model-call timeout. Defaults to `60`.
//! - `BACKEND_BASE_URL` - Optional. Telecom REST backend. Defaults to `http://localhost:8000/api/v1`.
//! - `TOOL_TIMEOUT_SECS` - Optional. Per tool-call timeout. Defaults to `30`.
//! - `TRANSCRIPTION_URL` - Optional. Speech-to-text endpoint. Transcription is disabled when unset.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `8080`.
//! - `MAX_ITERATIONS` - Optional. Tool iterations per chat turn. Defaults to `5`.
//! - `MEMORY_TOKEN_LIMIT` - Optional. Approximate token ceiling per session. Defaults to `2000`.
//! - `DEFAULT_SESSION_ID` - Optional. Session used when a caller omits one. Defaults to `default`.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Language model endpoint configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,

    /// Bearer token sent with every request
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature (kept low, the loop relies on a stable format)
    pub temperature: f32,

    /// Upper bound for a single completion round-trip
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            api_key: "lm-studio".to_string(),
            model: "google/gemma-3-12b".to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Tunables of the reasoning loop and the session store.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Maximum number of tool iterations in one chat turn
    pub max_iterations: usize,

    /// Approximate token ceiling for a session's history
    pub memory_token_limit: usize,

    /// Upper bound for a single tool invocation
    pub tool_timeout: Duration,

    /// Session id used when the caller does not supply one
    pub default_session_id: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            memory_token_limit: 2000,
            tool_timeout: Duration::from_secs(30),
            default_session_id: "default".to_string(),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Language model endpoint
    pub llm: LlmConfig,

    /// Base URL of the telecom backend consumed by the tools
    pub backend_base_url: String,

    /// Speech-to-text endpoint, if any
    pub transcription_url: Option<String>,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Agent loop and memory tunables
    pub agent: AgentSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse
    /// or an iteration/memory bound is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = LlmConfig::default();
        let llm = LlmConfig {
            base_url: env_or("LLM_BASE_URL", &defaults.base_url),
            api_key: env_or("LLM_API_KEY", &defaults.api_key),
            model: env_or("LLM_MODEL", &defaults.model),
            temperature: parse_env("LLM_TEMPERATURE", defaults.temperature)?,
            timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60u64)?),
        };

        let backend_base_url = env_or("BACKEND_BASE_URL", "http://localhost:8000/api/v1");

        let transcription_url = std::env::var("TRANSCRIPTION_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let host = env_or("HOST", "0.0.0.0");
        let port = parse_env("PORT", 8080u16)?;

        let agent = AgentSettings {
            max_iterations: parse_env("MAX_ITERATIONS", 5usize)?,
            memory_token_limit: parse_env("MEMORY_TOKEN_LIMIT", 2000usize)?,
            tool_timeout: Duration::from_secs(parse_env("TOOL_TIMEOUT_SECS", 30u64)?),
            default_session_id: env_or("DEFAULT_SESSION_ID", "default"),
        };

        if agent.max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if agent.memory_token_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "MEMORY_TOKEN_LIMIT".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            llm,
            backend_base_url,
            transcription_url,
            host,
            port,
            agent,
        })
    }

    /// Create a config with custom endpoints (useful for testing).
    pub fn new(llm_base_url: String, backend_base_url: String) -> Self {
        Self {
            llm: LlmConfig {
                base_url: llm_base_url,
                ..LlmConfig::default()
            },
            backend_base_url,
            transcription_url: None,
            host: "127.0.0.1".to_string(),
            port: 8080,
            agent: AgentSettings::default(),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}
