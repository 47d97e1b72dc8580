//! Agent module - the reasoning loop behind every chat turn.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Render the prompt from tools, session history, input, and scratch log
//! 2. Ask the language model for the next step
//! 3. If it names a tool, run it and append the observation to the scratch log
//! 4. Repeat until a final answer, a terminal tool, or the iteration cap

mod agent_loop;
mod parser;
mod prompt;

pub use agent_loop::{
    Agent, AgentError, ChatReply, RunOutcome, ITERATION_LIMIT_REPLY, PARSE_FAILURE_REPLY,
};
pub use parser::{parse_decision, parse_response, resolve, Decision, ParseFailure};
pub use prompt::{build_prompt, PromptContext, ScratchStep};
