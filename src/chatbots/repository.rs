use async_trait::async_trait;

use super::{Chatbot, FlowNode};

/// Read access to stored chatbot configuration. Load failures are absorbed
/// (logged, then treated as absent config): a chatbot that cannot be read is
/// indistinguishable from one that does not exist.
#[async_trait]
pub trait ChatbotRepository: Send + Sync {
    async fn get_chatbot(&self, id: &str) -> Option<Chatbot>;

    /// Linked nodes in ascending order-index, registry defaults overlaid by
    /// link settings. Links with unknown node keys are dropped.
    async fn linked_nodes(&self, chatbot_id: &str) -> Vec<FlowNode>;
}
