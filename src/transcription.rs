//! Speech-to-text client.
//!
//! The endpoint takes the raw audio bytes as the request body and answers
//! with the transcript as plain text.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("audio payload is empty")]
    EmptyAudio,

    #[error("transcription request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("transcription endpoint returned HTTP {0}")]
    Status(u16),

    #[error("transcription is empty")]
    EmptyTranscript,
}

/// Client for an external transcription endpoint.
#[derive(Debug, Clone)]
pub struct TranscriptionClient {
    client: reqwest::Client,
    url: String,
}

impl TranscriptionClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send audio and return the trimmed transcript.
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        content_type: &str,
    ) -> Result<String, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }

        tracing::debug!(bytes = audio.len(), content_type, "Sending audio for transcription");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, content_type)
            .body(audio)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Transcription endpoint error");
            return Err(TranscriptionError::Status(status.as_u16()));
        }

        let text = response.text().await?.trim().to_string();
        if text.is_empty() {
            return Err(TranscriptionError::EmptyTranscript);
        }
        Ok(text)
    }
}
