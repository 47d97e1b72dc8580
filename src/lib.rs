//! # CallCenter Agent
//!
//! A tool-routing conversational agent for a telecom call center.
//!
//! This library provides:
//! - An HTTP API for chatting with the agent and managing sessions
//! - A bounded reasoning loop that lets a language model call backend tools
//! - The telecom tool catalogue (packages, users, invoices, outages)
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive a customer message via the API
//! 2. Render a prompt with the tools, the session history, and the message
//! 3. Call the model, parse its reply, execute the tool it names
//! 4. Feed the observation back, repeat until a final answer or the cap
//!
//! ## Example
//!
//! ```rust,ignore
//! use callcenter_agent::{agent::Agent, config::Config};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::from_config(&config)?;
//! let reply = agent.chat("Faturam ne kadar?", Some("caller-42")).await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod session;
pub mod tools;
pub mod transcription;

pub use config::Config;
