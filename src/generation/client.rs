//! HTTP client for an Ollama-compatible chat endpoint.
//!
//! The CLI fills host and model from flags, falling back to `OLLAMA_HOST` and
//! `OLLAMA_MODEL`, then to the config file.

use std::time::Duration;

use reqwest::Client;

use super::{ChatMessage, ChatRequest, ChatResponse, GenerationError, GenerationService};

/// Default URL for a local Ollama daemon.
pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Client for Ollama's `/api/chat`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaClient {
    /// Create with explicit configuration. `timeout` bounds each whole request.
    pub fn new(
        host: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GenerationError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: normalize_host(&host.into()),
            model: model.into(),
            client: builder.build()?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a single user message and return the assistant's reply.
    pub async fn chat(&self, content: &str) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(content)],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .message
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

impl GenerationService for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.chat(prompt).await
    }
}

/// Accept `host:port` as well as full URLs, and drop trailing slashes.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}
