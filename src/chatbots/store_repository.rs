use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::repository::ChatbotRepository;
use super::{BasePromptEntry, Chatbot, FlowNode};
use crate::assembly::registry::{node_definition, resolve_settings};
use crate::store::{ReadQuery, StoreClient};

const CHATBOT_COLUMNS: &[&str] = &["id", "name", "base_prompts", "is_active", "model_name"];
const LINK_COLUMNS: &[&str] = &["node_key", "order_index", "settings"];

/// Chatbot configuration reads backed by the hosted store (`chatbots` and
/// `chatbot_flow_node_links` tables).
pub struct StoreChatbotRepository {
    store: Arc<dyn StoreClient>,
}

impl StoreChatbotRepository {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }
}

#[derive(Deserialize)]
struct ChatbotRow {
    id: String,
    name: String,
    #[serde(default)]
    base_prompts: Value,
    #[serde(default)]
    is_active: bool,
    #[serde(default)]
    model_name: Option<String>,
}

#[derive(Deserialize)]
struct LinkRow {
    node_key: String,
    #[serde(default)]
    order_index: i64,
    #[serde(default)]
    settings: Option<Value>,
}

fn parse_chatbot(row: Value) -> Option<Chatbot> {
    let row: ChatbotRow = match serde_json::from_value(row) {
        Ok(row) => row,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse chatbot row");
            return None;
        }
    };
    // Entries without string content are dropped, not fatal.
    let base_prompts: Vec<BasePromptEntry> = row
        .base_prompts
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    Some(Chatbot {
        id: row.id,
        name: row.name,
        base_prompts,
        is_active: row.is_active,
        model_name: row.model_name,
    })
}

#[async_trait]
impl ChatbotRepository for StoreChatbotRepository {
    async fn get_chatbot(&self, id: &str) -> Option<Chatbot> {
        let query = ReadQuery::new("chatbots", CHATBOT_COLUMNS).filter_eq("id", id);
        match self.store.read_one(query).await {
            Ok(Some(row)) => parse_chatbot(row),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(chatbot_id = %id, error = %e, "failed to load chatbot");
                None
            }
        }
    }

    async fn linked_nodes(&self, chatbot_id: &str) -> Vec<FlowNode> {
        let query = ReadQuery::new("chatbot_flow_node_links", LINK_COLUMNS)
            .filter_eq("chatbot_id", chatbot_id)
            .order_asc("order_index");
        let rows = match self.store.read(query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(chatbot_id = %chatbot_id, error = %e, "failed to load linked nodes");
                return Vec::new();
            }
        };

        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let link: LinkRow = match serde_json::from_value(row) {
                Ok(link) => link,
                Err(e) => {
                    tracing::warn!(chatbot_id = %chatbot_id, error = %e, "failed to parse node link");
                    continue;
                }
            };
            let Some(def) = node_definition(&link.node_key) else {
                tracing::debug!(node_key = %link.node_key, "unknown node kind, skipping");
                continue;
            };
            nodes.push(FlowNode {
                key: link.node_key,
                name: def.name.to_string(),
                kind: def.kind,
                settings: resolve_settings(def, link.settings.as_ref()),
                order_index: link.order_index,
            });
        }
        nodes
    }
}
