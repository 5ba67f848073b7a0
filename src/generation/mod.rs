//! External text-generation service used by the batch rewriter.
//!
//! The rewriter only needs "send this prompt, get text back", expressed by
//! [`GenerationService`]. [`OllamaClient`] implements it over Ollama's chat API.

mod client;

pub use client::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generation service errors.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generation service returned an empty message")]
    EmptyResponse,
}

/// Sends one prompt and returns the generated text.
#[allow(async_fn_in_trait)]
pub trait GenerationService {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

// ============================================================
// Wire Types
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Non-streaming `/api/chat` response. Other fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: Option<ChatMessage>,
}
