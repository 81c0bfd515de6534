use futures::future::join_all;
use serde::Serialize;

use super::UserContext;
use super::datasources::data_source_label;
use super::fetch::{DataBlock, fetch_data_for_source};
use super::registry::NodeSettings;
use super::scope::{Scope, scope_sentence};
use crate::chatbots::repository::ChatbotRepository;
use crate::chatbots::{Chatbot, FlowNode};
use crate::store::StoreClient;

const WEB_SEARCH_TEXT: &str = "[Web search] When web search is enabled for this turn, you may use Google Search to fetch current information from the web.";
const ATTACHMENTS_TEXT: &str = "[Attachments] The user may attach images, PDFs, or documents to their message. Use the provided image and document content when answering.";

const NO_DATA_SENTINEL: &str = "(No data for this context)";
const SELECT_USER_SENTINEL: &str = "(Select a user above to see data for this source)";

#[derive(thiserror::Error, Debug)]
pub enum AssemblyError {
    #[error("chatbot not found: {0}")]
    ChatbotNotFound(String),
}

/// A non-data node's rendered contribution, for the explainability view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionBlock {
    pub node_name: String,
    pub content: String,
}

/// A data access node's rendered contribution. `content` is the fetched
/// rows, or a sentinel explaining why there are none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataModule {
    pub node_name: String,
    pub label: String,
    pub data_source: String,
    pub content: String,
}

/// The full result of assembling a chatbot's prompt. `prompt` is the joined
/// text handed to the LLM; the remaining fields are the structured breakdown
/// the admin explainability endpoint exposes.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledPrompt {
    pub prompt: String,
    pub chatbot: Chatbot,
    pub base_prompt: String,
    pub instruction_blocks: Vec<InstructionBlock>,
    pub data_modules: Vec<DataModule>,
    pub web_search_enabled: bool,
    pub attachments_enabled: bool,
}

/// Assemble the system prompt for a chatbot: stored base prompt plus the
/// contribution of each linked node, in configured order.
///
/// Data access nodes fetch rows when the caller has an identity; platform-
/// wide nodes fetch regardless (shared reference data). Fetches for distinct
/// nodes run concurrently and are reassembled in node order. A missing
/// chatbot is the only hard failure; everything else degrades to less
/// context in the prompt.
pub async fn assemble(
    repo: &dyn ChatbotRepository,
    store: &dyn StoreClient,
    chatbot_id: &str,
    user_context: Option<&UserContext>,
) -> Result<AssembledPrompt, AssemblyError> {
    let chatbot = repo
        .get_chatbot(chatbot_id)
        .await
        .ok_or_else(|| AssemblyError::ChatbotNotFound(chatbot_id.to_string()))?;
    let nodes = repo.linked_nodes(chatbot_id).await;

    let blocks = fetch_all_data(store, &nodes, user_context).await;

    let base_prompt = chatbot.base_prompt_text();
    let mut parts = vec![base_prompt.clone()];
    let mut instruction_blocks = Vec::new();
    let mut data_modules = Vec::new();
    let mut web_search_enabled = false;
    let mut attachments_enabled = false;

    for (node, block) in nodes.iter().zip(blocks) {
        match &node.settings {
            NodeSettings::DataAccess { data_source, scope } => {
                let label = if data_source.is_empty() {
                    "general data"
                } else {
                    data_source_label(data_source)
                };
                let mut text = format!(
                    "[Data access] You may reference {label}, {}. Do not assume data from other teams or users unless scope is platform-wide.",
                    scope_sentence(*scope)
                );
                if let Some(data_text) = block.as_ref().and_then(DataBlock::prompt_text) {
                    text.push_str("\n\n[Current data for this context]\n");
                    text.push_str(data_text);
                }
                data_modules.push(DataModule {
                    node_name: node.name.clone(),
                    label: label.to_string(),
                    data_source: data_source.clone(),
                    content: module_content(block.as_ref()),
                });
                parts.push(text);
            }
            NodeSettings::SubAgent { expertise_prompt } => {
                let expertise = expertise_prompt.trim();
                if !expertise.is_empty() {
                    let text = format!("[Specialization]\n{expertise}");
                    instruction_blocks.push(InstructionBlock {
                        node_name: node.name.clone(),
                        content: text.clone(),
                    });
                    parts.push(text);
                }
            }
            NodeSettings::WebSearch {} => {
                web_search_enabled = true;
                instruction_blocks.push(InstructionBlock {
                    node_name: node.name.clone(),
                    content: WEB_SEARCH_TEXT.to_string(),
                });
                parts.push(WEB_SEARCH_TEXT.to_string());
            }
            NodeSettings::Attachments {} => {
                attachments_enabled = true;
                instruction_blocks.push(InstructionBlock {
                    node_name: node.name.clone(),
                    content: ATTACHMENTS_TEXT.to_string(),
                });
                parts.push(ATTACHMENTS_TEXT.to_string());
            }
        }
    }

    Ok(AssembledPrompt {
        prompt: parts.join("\n\n"),
        chatbot,
        base_prompt,
        instruction_blocks,
        data_modules,
        web_search_enabled,
        attachments_enabled,
    })
}

/// Issue every data access node's fetch concurrently; results come back in
/// node order. `None` means no fetch was attempted for that node (non-data
/// node, or a scoped node with no caller identity).
async fn fetch_all_data(
    store: &dyn StoreClient,
    nodes: &[FlowNode],
    user_context: Option<&UserContext>,
) -> Vec<Option<DataBlock>> {
    let empty = UserContext::empty();
    let caller = user_context.unwrap_or(&empty);
    let has_identity = user_context.is_some_and(UserContext::has_identity);

    let fetches = nodes.iter().map(|node| {
        let plan = match &node.settings {
            NodeSettings::DataAccess { data_source, scope } => {
                if has_identity {
                    Some((data_source.as_str(), *scope, caller))
                } else if *scope == Scope::All {
                    // Platform-wide nodes carry shared reference data even
                    // for anonymous assembly.
                    Some((data_source.as_str(), *scope, &empty))
                } else {
                    None
                }
            }
            _ => None,
        };
        async move {
            match plan {
                Some((data_source, scope, context)) => {
                    Some(fetch_data_for_source(store, data_source, scope, context).await)
                }
                None => None,
            }
        }
    });
    join_all(fetches).await
}

fn module_content(block: Option<&DataBlock>) -> String {
    match block {
        None => SELECT_USER_SENTINEL.to_string(),
        Some(DataBlock::Skipped) => NO_DATA_SENTINEL.to_string(),
        Some(block) => block
            .prompt_text()
            .unwrap_or(NO_DATA_SENTINEL)
            .to_string(),
    }
}
