pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Conversation turns older than this are dropped before the provider call.
pub const MAX_HISTORY_TURNS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Model,
    /// Accepted from clients as a synonym for `model`.
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Attachments to a chat turn. Images arrive as URLs; documents arrive as
/// already-extracted text (the extraction pipeline is upstream of this
/// service).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    Image { url: String },
    Document { text: String, file_name: String },
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Provider model id; falls back to the client's default when None.
    pub model: Option<String>,
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub attachments: Vec<Attachment>,
    /// Enables the provider's live web-search tool for this turn.
    pub web_search: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReply {
    pub text: String,
    pub thought_summary: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("LLM API key not configured")]
    NotConfigured,

    #[error("transport: {0}")]
    Transport(String),

    #[error("provider responded {status}: {body}")]
    Api { status: u16, body: String },

    #[error("no response from model")]
    EmptyResponse,
}

/// Text-completion provider. Receives the assembled prompt and conversation;
/// everything about prompt content is decided upstream.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply, LlmError>;
}
