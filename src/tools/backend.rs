//! HTTP client for the telecom backend consumed by the tools.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Coarse transport failure category; the only detail ever shown to customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    Request,
    Body,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "zaman aşımı"),
            Self::Connect => write!(f, "bağlantı hatası"),
            Self::Request => write!(f, "istek hatası"),
            Self::Body => write!(f, "yanıt okunamadı"),
        }
    }
}

impl From<&reqwest::Error> for TransportKind {
    fn from(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect
        } else if e.is_body() || e.is_decode() {
            Self::Body
        } else {
            Self::Request
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend returned HTTP {0}")]
    Status(u16),

    #[error("backend request failed: {0}")]
    Transport(TransportKind),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            Self::Transport(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Generic customer-facing text for failures a tool has no specific message for.
    pub fn user_message(&self, subject: &str) -> String {
        match self {
            Self::Status(code) => format!("{} sorgulanamadı. HTTP {} hatası.", subject, code),
            Self::Transport(kind) => format!("Sistem hatası: {} alınamadı - {}", subject, kind),
        }
    }
}

/// Thin wrapper over `reqwest` bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("callcenter-agent/0.3")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a resource and return the body verbatim.
    pub async fn get(&self, path: &str) -> Result<String, BackendError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "Backend GET");
        let response = self.http.get(&url).send().await.map_err(transport)?;
        read_body(response).await
    }

    /// POST a JSON payload and return the body verbatim.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<String, BackendError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "Backend POST");
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        read_body(response).await
    }
}

fn transport(e: reqwest::Error) -> BackendError {
    let kind = TransportKind::from(&e);
    tracing::warn!(error = %e, kind = ?kind, "Backend request failed");
    BackendError::Transport(kind)
}

async fn read_body(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = %status, url = %response.url(), "Backend returned error status");
        return Err(BackendError::Status(status.as_u16()));
    }
    response.text().await.map_err(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn get_passes_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/packages"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"name":"Mega 20"}]"#))
            .mount(&server)
            .await;

        let client =
            BackendClient::new(format!("{}/api/v1/", server.uri()), Duration::from_secs(5)).unwrap();
        let body = client.get("/packages").await.unwrap();
        assert_eq!(body, r#"[{"name":"Mega 20"}]"#);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = client.get("users/phone/05551234567").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            BackendError::Status(500).user_message("Paket bilgileri"),
            "Paket bilgileri sorgulanamadı. HTTP 500 hatası."
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_failure() {
        // Port 9 (discard) is closed on test machines.
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.get("packages").await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
        assert!(err.user_message("Paket listesi").starts_with("Sistem hatası: Paket listesi alınamadı"));
    }
}
