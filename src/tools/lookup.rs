//! Read-only lookups keyed by the customer's phone number.
//!
//! Most customer-scoped endpoints share one shape: validate the number, GET a
//! path built from it, pass the body through, and map 404 to a friendly text.
//! Each such tool is a [`PhoneLookup`] row rather than its own type.

use std::sync::Arc;

use async_trait::async_trait;

use super::{normalize_phone, BackendClient, ParamSpec, Tool, ToolArgs, INVALID_PHONE_MESSAGE};

const PHONE_PARAM: &[ParamSpec] = &[ParamSpec::required(
    "phonenumber",
    "Müşterinin telefon numarası (örn: 05551234567)",
)];

/// Backend lookup by phone number.
pub struct PhoneLookup {
    pub(crate) name: &'static str,
    pub(crate) description: &'static str,
    /// Builds the request path from a normalized number.
    pub(crate) endpoint: fn(&str) -> String,
    /// Text for 404; `{phone}` is replaced with the normalized number.
    pub(crate) not_found: &'static str,
    /// Noun phrase used in generic failure texts.
    pub(crate) subject: &'static str,
    pub(crate) backend: Arc<BackendClient>,
}

#[async_trait]
impl Tool for PhoneLookup {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parameters(&self) -> &[ParamSpec] {
        PHONE_PARAM
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<String> {
        let given = args.text("phonenumber").trim();
        let phone = match normalize_phone(given) {
            Ok(phone) => phone,
            Err(e) => {
                tracing::debug!(tool = self.name, error = %e, "Rejected phone number");
                return Ok(INVALID_PHONE_MESSAGE.to_string());
            }
        };

        match self.backend.get(&(self.endpoint)(&phone)).await {
            Ok(body) => Ok(body),
            Err(e) if e.is_not_found() => Ok(self.not_found.replace("{phone}", &phone)),
            Err(e) => Ok(e.user_message(self.subject)),
        }
    }
}
