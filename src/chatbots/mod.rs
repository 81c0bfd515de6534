pub mod repository;
pub mod store_repository;

use serde::{Deserialize, Serialize};

use crate::assembly::registry::{NodeKind, NodeSettings};

/// Substituted when a chatbot has no usable base prompt entries.
pub const DEFAULT_BASE_PROMPT: &str = "You are a helpful AI assistant.";

/// Metadata attached to a base prompt entry whose content was extracted from
/// an uploaded file or a Loom recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loom_metadata: Option<LoomMetadata>,
}

/// Loom recording details, stored with the field names the extraction
/// service reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoomMetadata {
    #[serde(
        default,
        rename = "thumbnailUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_formatted: Option<String>,
}

/// One entry of a chatbot's stored base prompt. Entries without string
/// content are dropped at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasePromptEntry {
    #[serde(rename = "type", default)]
    pub entry_type: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_metadata: Option<ExtractionMetadata>,
}

/// An agent configuration: stored base prompt plus an ordered list of
/// capability nodes (loaded separately). Read-only to the assembly engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chatbot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub base_prompts: Vec<BasePromptEntry>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl Chatbot {
    /// The root of every assembled prompt: non-empty entry contents joined
    /// by blank lines, or the fixed default when nothing usable is stored.
    pub fn base_prompt_text(&self) -> String {
        let joined = self
            .base_prompts
            .iter()
            .map(|entry| entry.content.trim())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        if joined.is_empty() {
            DEFAULT_BASE_PROMPT.to_string()
        } else {
            joined
        }
    }
}

/// A capability node linked to a chatbot, with registry defaults already
/// overlaid by the link's settings. Order index drives concatenation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub key: String,
    pub name: String,
    pub kind: NodeKind,
    pub settings: NodeSettings,
    pub order_index: i64,
}
