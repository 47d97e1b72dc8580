//! Tool registry: lookup by name and fault-isolated invocation.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::args::{coerce_arguments, structured_arguments};
use super::direct::FinalAnswer;
use super::Tool;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("tool '{0}' not found")]
    ToolNotFound(String),
}

/// Input handed to a tool invocation.
#[derive(Debug, Clone)]
pub enum ToolInput {
    /// Free text as produced by the model.
    Raw(String),
    /// Already-structured arguments; bypasses the text grammar.
    Structured(Map<String, Value>),
}

/// Name and description of a registered tool.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
}

/// Result of one invocation, always renderable as an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    /// Canonical name of the tool that ran.
    pub tool: String,
    pub text: String,
    /// The result should be returned to the customer and the run should stop.
    pub terminal: bool,
    /// Argument, timeout, or fault; the text explains it.
    pub failed: bool,
}

/// Registry of available tools, in registration order.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
    timeout: Duration,
}

impl ToolRegistry {
    /// Create a registry holding only the reserved direct-answer tool.
    pub fn new(timeout: Duration) -> Self {
        let mut registry = Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
            timeout,
        };
        registry.insert(Arc::new(FinalAnswer));
        registry
    }

    fn insert(&mut self, tool: Arc<dyn Tool>) {
        self.by_name
            .insert(tool.name().to_lowercase(), self.tools.len());
        self.tools.push(tool);
    }

    /// Register a tool. Names are unique, ignoring ASCII case.
    pub fn register<T>(&mut self, tool: T) -> Result<(), RegistryError>
    where
        T: Tool + 'static,
    {
        let key = tool.name().to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(RegistryError::DuplicateTool(tool.name().to_string()));
        }
        self.insert(Arc::new(tool));
        Ok(())
    }

    /// Find a tool by exact name, falling back to a case-insensitive match.
    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        let name = name.trim();
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .or_else(|| {
                self.by_name
                    .get(&name.to_lowercase())
                    .map(|&idx| &self.tools[idx])
            })
            .map(|t| t.as_ref())
    }

    /// All tools as (name, description), in registration order.
    pub fn describe_all(&self) -> Vec<ToolDescription> {
        self.tools
            .iter()
            .map(|t| ToolDescription {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool with raw model text as input.
    pub async fn invoke(&self, name: &str, raw_input: &str) -> Result<ToolOutcome, RegistryError> {
        self.invoke_input(name, ToolInput::Raw(raw_input.to_string()))
            .await
    }

    /// Invoke a tool.
    ///
    /// Only an unknown name is an error. Argument problems, timeouts, errors,
    /// and panics inside the tool all come back as a failed [`ToolOutcome`].
    pub async fn invoke_input(
        &self,
        name: &str,
        input: ToolInput,
    ) -> Result<ToolOutcome, RegistryError> {
        let tool = self
            .find(name)
            .ok_or_else(|| RegistryError::ToolNotFound(name.trim().to_string()))?;
        let tool_name = tool.name().to_string();

        let args = match &input {
            ToolInput::Raw(raw) => coerce_arguments(raw, tool.parameters()),
            ToolInput::Structured(map) => structured_arguments(map, tool.parameters()),
        };
        let args = match args {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(tool = %tool_name, error = %e, "Rejected tool arguments");
                let text = format!(
                    "'{}' aracı için geçersiz parametre: {}. Beklenen parametreler: {}.",
                    tool_name,
                    e,
                    expected_parameters(tool)
                );
                return Ok(ToolOutcome::failed(tool_name, text));
            }
        };

        tracing::info!(tool = %tool_name, args = ?args, "Calling tool");

        let call = AssertUnwindSafe(tool.execute(args)).catch_unwind();
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(text))) => ToolOutcome {
                tool: tool_name,
                text,
                terminal: tool.is_terminal(),
                failed: false,
            },
            Ok(Ok(Err(e))) => {
                tracing::warn!(tool = %tool_name, error = %e, "Tool returned an error");
                ToolOutcome::failed(tool_name, system_error(error_category(&e)))
            }
            Ok(Err(_panic)) => {
                tracing::error!(tool = %tool_name, "Tool panicked");
                ToolOutcome::failed(tool_name, system_error("beklenmeyen hata"))
            }
            Err(_) => {
                tracing::warn!(tool = %tool_name, timeout = ?self.timeout, "Tool timed out");
                ToolOutcome::failed(tool_name, system_error("zaman aşımı"))
            }
        };

        Ok(outcome)
    }
}

impl ToolOutcome {
    fn failed(tool: String, text: String) -> Self {
        Self {
            tool,
            text,
            terminal: false,
            failed: true,
        }
    }
}

fn system_error(category: &str) -> String {
    format!("Sistem hatası: işlem gerçekleştirilemedi ({}).", category)
}

fn error_category(e: &anyhow::Error) -> &'static str {
    match e.downcast_ref::<reqwest::Error>() {
        Some(re) if re.is_timeout() => "zaman aşımı",
        Some(re) if re.is_connect() => "bağlantı hatası",
        Some(_) => "istek hatası",
        None => "işlem hatası",
    }
}

fn expected_parameters(tool: &dyn Tool) -> String {
    let params = tool.parameters();
    if params.is_empty() {
        return "yok".to_string();
    }
    params
        .iter()
        .map(|p| {
            if p.optional {
                format!("{} (isteğe bağlı)", p.name)
            } else {
                p.name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::tools::{ParamSpec, ToolArgs, FINAL_ANSWER_TOOL};

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo_city"
        }

        fn description(&self) -> &str {
            "Repeats the city back."
        }

        fn parameters(&self) -> &[ParamSpec] {
            const PARAMS: &[ParamSpec] = &[ParamSpec::required("city", "city name")];
            PARAMS
        }

        async fn execute(&self, args: ToolArgs) -> anyhow::Result<String> {
            Ok(format!("city={}", args.text("city")))
        }
    }

    struct Exploding;

    #[async_trait]
    impl Tool for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn description(&self) -> &str {
            "Always panics."
        }

        async fn execute(&self, _args: ToolArgs) -> anyhow::Result<String> {
            panic!("boom");
        }
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always errors."
        }

        async fn execute(&self, _args: ToolArgs) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("database exploded at /var/lib/secret"))
        }
    }

    struct Sleepy(Arc<AtomicUsize>);

    #[async_trait]
    impl Tool for Sleepy {
        fn name(&self) -> &str {
            "sleepy"
        }

        fn description(&self) -> &str {
            "Never finishes in time."
        }

        async fn execute(&self, _args: ToolArgs) -> anyhow::Result<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("late".to_string())
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new(Duration::from_millis(200));
        registry.register(Echo).unwrap();
        registry.register(Exploding).unwrap();
        registry.register(Failing).unwrap();
        registry
    }

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let mut registry = registry();
        assert_eq!(
            registry.register(Echo),
            Err(RegistryError::DuplicateTool("echo_city".to_string()))
        );
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn describe_all_keeps_registration_order() {
        let names: Vec<String> = registry()
            .describe_all()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec![FINAL_ANSWER_TOOL, "echo_city", "exploding", "failing"]);
    }

    #[test]
    fn find_is_case_insensitive() {
        let registry = registry();
        assert_eq!(registry.find("Echo_City").map(|t| t.name()), Some("echo_city"));
        assert!(registry.find("echo").is_none());
    }

    #[tokio::test]
    async fn unknown_tool_is_a_registry_error() {
        let err = registry().invoke("get_weather", "Ankara").await.unwrap_err();
        assert_eq!(err, RegistryError::ToolNotFound("get_weather".to_string()));
    }

    #[tokio::test]
    async fn final_answer_is_terminal_and_verbatim() {
        let outcome = registry()
            .invoke("final_answer", "Size nasıl yardımcı olabilirim?")
            .await
            .unwrap();
        assert!(outcome.terminal);
        assert!(!outcome.failed);
        assert_eq!(outcome.text, "Size nasıl yardımcı olabilirim?");
    }

    #[tokio::test]
    async fn structured_input_bypasses_text_grammar() {
        let mut map = Map::new();
        map.insert("CITY".to_string(), json!("İzmir, Karşıyaka"));
        let outcome = registry()
            .invoke_input("echo_city", ToolInput::Structured(map))
            .await
            .unwrap();
        assert_eq!(outcome.text, "city=İzmir, Karşıyaka");
        assert!(!outcome.terminal);
    }

    #[tokio::test]
    async fn panics_become_observations() {
        let outcome = registry().invoke("exploding", "").await.unwrap();
        assert!(outcome.failed);
        assert!(outcome.text.starts_with("Sistem hatası"));
    }

    #[tokio::test]
    async fn errors_hide_internal_detail() {
        let outcome = registry().invoke("failing", "").await.unwrap();
        assert!(outcome.failed);
        assert!(!outcome.text.contains("/var/lib/secret"));
        assert!(outcome.text.contains("işlem hatası"));
    }

    #[tokio::test]
    async fn bad_arguments_become_observations() {
        let outcome = registry().invoke("echo_city", "").await.unwrap();
        assert!(outcome.failed);
        assert!(outcome.text.contains("city"));
    }

    #[tokio::test]
    async fn slow_tools_time_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new(Duration::from_millis(50));
        registry.register(Sleepy(calls.clone())).unwrap();

        let outcome = registry.invoke("sleepy", "").await.unwrap();
        assert!(outcome.failed);
        assert!(outcome.text.contains("zaman aşımı"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
