//! Tool system for the agent.
//!
//! Tools are the actions the agent can take on behalf of a customer:
//! - Catalogue: list packages, look one up by type or name
//! - Customer: look up or create an account, ask for missing details
//! - Usage: active package, remaining uses, purchased services
//! - Billing: active subscription, invoices
//! - Support: regional outage lookup
//! - `final_answer`: reply directly and stop
//!
//! Every tool declares its parameters; the registry coerces whatever text the
//! model produced into that shape before calling it.

mod args;
mod backend;
mod billing;
mod customer;
mod direct;
mod lookup;
mod packages;
mod phone;
mod registry;
mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

pub use args::{coerce_arguments, parse_key_values, ArgumentError, ToolArgs};
pub use backend::{BackendClient, BackendError, TransportKind};
pub use billing::{active_invoice, active_invoice_items, active_subscription, invoices};
pub use customer::{control_by_phonenumber, PostNewUser, RequestUserInfo};
pub use direct::{FinalAnswer, RequestPhoneNumber, FINAL_ANSWER_TOOL};
pub use lookup::PhoneLookup;
pub use packages::{
    package_by_usernumber, remaining_uses, service_purchases, AllPackages, PackageByName,
    PackagesByType,
};
pub use phone::{normalize_phone, PhoneError, INVALID_PHONE_MESSAGE, MIN_PHONE_DIGITS};
pub use registry::{RegistryError, ToolDescription, ToolInput, ToolOutcome, ToolRegistry};
pub use support::LocationProblems;

/// Primitive kind of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
}

impl ParamKind {
    fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

/// One named parameter in a tool's argument schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub optional: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            optional: false,
            description,
        }
    }

    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            optional: true,
            description,
        }
    }

    pub const fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Trait for implementing tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name (stable key, used by the model to select it).
    fn name(&self) -> &str;

    /// Get the tool description (shown to the model).
    fn description(&self) -> &str;

    /// Ordered argument schema.
    fn parameters(&self) -> &[ParamSpec] {
        &[]
    }

    /// Terminal tools end the run; their result goes to the customer unmodified.
    fn is_terminal(&self) -> bool {
        false
    }

    /// JSON schema of the parameters, for introspection endpoints.
    fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in self.parameters() {
            properties.insert(
                param.name.to_string(),
                json!({
                    "type": param.kind.json_type(),
                    "description": param.description,
                }),
            );
            if !param.optional {
                required.push(Value::String(param.name.to_string()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Execute the tool with already-coerced arguments.
    ///
    /// Validation and backend failures are returned as `Ok` guidance text;
    /// `Err` is reserved for faults the tool could not classify.
    async fn execute(&self, args: ToolArgs) -> anyhow::Result<String>;
}

/// Build the registry with every customer-service tool, in prompt order.
pub fn default_registry(
    backend: BackendClient,
    tool_timeout: Duration,
) -> Result<ToolRegistry, RegistryError> {
    let backend = Arc::new(backend);
    let mut registry = ToolRegistry::new(tool_timeout);

    registry.register(AllPackages::new(backend.clone()))?;
    registry.register(package_by_usernumber(backend.clone()))?;
    registry.register(RequestUserInfo)?;
    registry.register(PostNewUser::new(backend.clone()))?;
    registry.register(PackagesByType::new(backend.clone()))?;
    registry.register(PackageByName::new(backend.clone()))?;
    registry.register(control_by_phonenumber(backend.clone()))?;
    registry.register(LocationProblems::new(backend.clone()))?;
    registry.register(remaining_uses(backend.clone()))?;
    registry.register(service_purchases(backend.clone()))?;
    registry.register(RequestPhoneNumber)?;
    registry.register(active_subscription(backend.clone()))?;
    registry.register(active_invoice(backend.clone()))?;
    registry.register(active_invoice_items(backend.clone()))?;
    registry.register(invoices(backend))?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn default_registry_lists_direct_answer_first() {
        let backend =
            BackendClient::new("http://127.0.0.1:9/api/v1", Duration::from_secs(1)).unwrap();
        let registry = default_registry(backend, Duration::from_secs(1)).unwrap();
        let names = registry.names();

        assert_eq!(names.first().copied(), Some(FINAL_ANSWER_TOOL));
        assert_eq!(names.len(), 16);
        assert!(names.contains(&"get_package_by_usernumber"));
        assert!(names.contains(&"get_invoices"));
    }

    #[test]
    fn schema_marks_required_parameters() {
        let schema = PostNewUser::new(Arc::new(
            BackendClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap(),
        ))
        .parameters_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["name", "phone"]));
        assert_eq!(schema["properties"]["email"]["type"], "string");
    }

    #[tokio::test]
    async fn every_phone_tool_rejects_short_numbers_without_calling_the_backend() {
        let server = MockServer::start().await;
        for verb in ["GET", "POST"] {
            Mock::given(method(verb))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;
        }

        let backend =
            BackendClient::new(format!("{}/api/v1", server.uri()), Duration::from_secs(5))
                .unwrap();
        let registry = default_registry(backend, Duration::from_secs(5)).unwrap();

        let cases = [
            ("get_package_by_usernumber", "0555 123"),
            ("get_user_remaining_uses", "0555 123"),
            ("get_service_purchases", "0555 123"),
            ("control_by_phonenumber", "0555 123"),
            ("get_active_subscription", "0555 123"),
            ("get_active_invoice", "0555 123"),
            ("get_active_invoice_items", "0555 123"),
            ("get_invoices", "0555 123"),
            ("post_new_user", "name=Ali Veli, phone=0555 123"),
        ];

        let mut phone_tools: Vec<&str> = registry
            .iter()
            .filter(|t| {
                t.parameters()
                    .iter()
                    .any(|p| p.name == "phone" || p.name == "phonenumber")
            })
            .map(|t| t.name())
            .collect();
        let mut covered: Vec<&str> = cases.iter().map(|(tool, _)| *tool).collect();
        phone_tools.sort_unstable();
        covered.sort_unstable();
        assert_eq!(phone_tools, covered);

        for (tool, input) in cases {
            let outcome = registry.invoke(tool, input).await.unwrap();
            assert_eq!(outcome.text, INVALID_PHONE_MESSAGE, "{tool} accepted {input}");
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
