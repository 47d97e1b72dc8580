//! Parse a raw model completion into a decision.
//!
//! Parsing happens in two stages: [`parse_response`] finds the markers in
//! the text, [`resolve`] checks the chosen tool against the registry.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::tools::ToolRegistry;

/// What the model decided to do this step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    FinalAnswer {
        text: String,
    },
    ToolCall {
        tool_name: String,
        raw_input: String,
        thought: String,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no action or final answer marker")]
    NoMarkers,

    #[error("final answer marker with empty text")]
    EmptyFinalAnswer,

    #[error("action marker without a tool name")]
    EmptyAction,

    #[error("action '{0}' without an action input")]
    MissingActionInput(String),

    #[error("unknown tool '{0}'")]
    UnknownTool(String),
}

fn final_answer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\bfinal[ \t_]*answer[ \t*]*:(.*)").expect("valid final answer regex")
    })
}

fn action_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t*#]*action[ \t*]*:[ \t]*(.*)$").expect("valid action regex")
    })
}

fn action_input_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?ims)^[ \t*#]*action[ \t_]*input[ \t*]*:(.*)")
            .expect("valid action input regex")
    })
}

fn observation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t*#]*(observation|thought)[ \t*]*:").expect("valid stop regex")
    })
}

fn thought_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[ \t*#]*thought[ \t*]*:").expect("valid thought regex"))
}

/// Extract a decision from raw model text. A final answer marker wins over
/// an action marker when both are present.
pub fn parse_response(raw: &str) -> Result<Decision, ParseFailure> {
    if let Some(caps) = final_answer_re().captures(raw) {
        let text = caps.get(1).map_or("", |m| m.as_str()).trim();
        if text.is_empty() {
            return Err(ParseFailure::EmptyFinalAnswer);
        }
        return Ok(Decision::FinalAnswer {
            text: text.to_string(),
        });
    }

    let Some(action) = action_re().captures(raw) else {
        return Err(ParseFailure::NoMarkers);
    };
    let action_match = action.get(0).map_or(0..0, |m| m.range());
    let tool_name = clean_tool_name(action.get(1).map_or("", |m| m.as_str()));
    if tool_name.is_empty() {
        return Err(ParseFailure::EmptyAction);
    }

    let after_action = &raw[action_match.end..];
    let Some(input) = action_input_re().captures(after_action) else {
        return Err(ParseFailure::MissingActionInput(tool_name));
    };
    let mut raw_input = input.get(1).map_or("", |m| m.as_str());
    if let Some(stop) = observation_re().find(raw_input) {
        raw_input = &raw_input[..stop.start()];
    }

    let thought = thought_prefix_re()
        .replace(raw[..action_match.start].trim(), "")
        .trim()
        .to_string();

    Ok(Decision::ToolCall {
        tool_name,
        raw_input: raw_input.trim().to_string(),
        thought,
    })
}

/// Map a parsed tool call to the registered tool's canonical name.
pub fn resolve(decision: Decision, registry: &ToolRegistry) -> Result<Decision, ParseFailure> {
    match decision {
        Decision::ToolCall {
            tool_name,
            raw_input,
            thought,
        } => match registry.find(&tool_name) {
            Some(tool) => Ok(Decision::ToolCall {
                tool_name: tool.name().to_string(),
                raw_input,
                thought,
            }),
            None => Err(ParseFailure::UnknownTool(tool_name)),
        },
        final_answer => Ok(final_answer),
    }
}

/// Parse and resolve in one step.
pub fn parse_decision(raw: &str, registry: &ToolRegistry) -> Result<Decision, ParseFailure> {
    resolve(parse_response(raw)?, registry)
}

/// Models decorate tool names with quotes, backticks, or a trailing `()`.
fn clean_tool_name(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(|c| matches!(c, '`' | '"' | '\'' | '*'));
    trimmed
        .split(|c: char| c.is_whitespace() || c == '(' || c == '[')
        .next()
        .unwrap_or("")
        .trim_matches(|c| matches!(c, '`' | '"' | '\'' | '*' | '.' | ','))
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn tool_call(name: &str, input: &str) -> Decision {
        match parse_response(&format!("Thought: x\nAction: {name}\nAction Input: {input}")) {
            Ok(d) => d,
            Err(e) => panic!("unexpected parse failure: {e}"),
        }
    }

    #[test]
    fn parses_a_tool_call() {
        let raw = "Thought: Müşterinin paketine bakmalıyım\n\
                   Action: get_package_by_usernumber\n\
                   Action Input: 05551234567";
        assert_eq!(
            parse_response(raw).unwrap(),
            Decision::ToolCall {
                tool_name: "get_package_by_usernumber".to_string(),
                raw_input: "05551234567".to_string(),
                thought: "Müşterinin paketine bakmalıyım".to_string(),
            }
        );
    }

    #[test]
    fn markers_tolerate_case_and_spacing() {
        let raw = "thought:bakalım\n  ACTION :  get_invoices  \n action input:   05551234567  ";
        let Decision::ToolCall {
            tool_name,
            raw_input,
            ..
        } = parse_response(raw).unwrap()
        else {
            panic!("expected a tool call");
        };
        assert_eq!(tool_name, "get_invoices");
        assert_eq!(raw_input, "05551234567");
    }

    #[test]
    fn final_answer_wins_over_action() {
        let raw = "Thought: cevap hazır\nAction: get_invoices\nAction Input: 0555\n\
                   Final Answer: Faturanız 250 TL.";
        assert_eq!(
            parse_response(raw).unwrap(),
            Decision::FinalAnswer {
                text: "Faturanız 250 TL.".to_string()
            }
        );
    }

    #[test]
    fn final_answer_keeps_multiline_text() {
        let raw = "Thought: selam\nFinal Answer: Merhaba!\nSize nasıl yardımcı olabilirim?";
        assert_eq!(
            parse_response(raw).unwrap(),
            Decision::FinalAnswer {
                text: "Merhaba!\nSize nasıl yardımcı olabilirim?".to_string()
            }
        );
    }

    #[test]
    fn action_input_stops_at_hallucinated_observation() {
        let raw = "Action: get_invoices\nAction Input: 05551234567\nObservation: uydurma sonuç";
        let Decision::ToolCall { raw_input, .. } = parse_response(raw).unwrap() else {
            panic!("expected a tool call");
        };
        assert_eq!(raw_input, "05551234567");
    }

    #[test]
    fn action_input_may_span_lines() {
        let raw = "Action: post_new_user\nAction Input: {\n  \"name\": \"Ali\",\n  \"phone\": \"05551234567\"\n}";
        let Decision::ToolCall { raw_input, .. } = parse_response(raw).unwrap() else {
            panic!("expected a tool call");
        };
        assert!(raw_input.starts_with('{'));
        assert!(raw_input.ends_with('}'));
    }

    #[test]
    fn decorated_tool_names_are_cleaned() {
        assert!(matches!(
            tool_call("`get_invoices`", "0555"),
            Decision::ToolCall { tool_name, .. } if tool_name == "get_invoices"
        ));
        assert!(matches!(
            tool_call("get_invoices()", "0555"),
            Decision::ToolCall { tool_name, .. } if tool_name == "get_invoices"
        ));
    }

    #[test]
    fn malformed_responses_are_failures() {
        assert_eq!(
            parse_response("Merhaba, size nasıl yardımcı olabilirim?"),
            Err(ParseFailure::NoMarkers)
        );
        assert_eq!(
            parse_response("Action: get_invoices"),
            Err(ParseFailure::MissingActionInput("get_invoices".to_string()))
        );
        assert_eq!(
            parse_response("Action:   \nAction Input: x"),
            Err(ParseFailure::EmptyAction)
        );
        assert_eq!(
            parse_response("Final Answer:   "),
            Err(ParseFailure::EmptyFinalAnswer)
        );
    }

    #[test]
    fn resolve_uses_canonical_names() {
        let registry = ToolRegistry::new(Duration::from_secs(1));
        let decision = parse_decision("Action: Final_Answer\nAction Input: Tamam", &registry);
        assert!(matches!(
            decision,
            Ok(Decision::ToolCall { tool_name, .. }) if tool_name == "final_answer"
        ));
    }

    #[test]
    fn unknown_tools_fail_resolution() {
        let registry = ToolRegistry::new(Duration::from_secs(1));
        assert_eq!(
            parse_decision("Action: get_weather\nAction Input: Ankara", &registry),
            Err(ParseFailure::UnknownTool("get_weather".to_string()))
        );
    }
}
