pub mod auth;
pub mod chat;
pub mod chatbots;
pub mod middleware;
mod routes;

use std::sync::Arc;

use axum::Router;

use crate::chatbots::repository::ChatbotRepository;
use crate::llm::LlmClient;
use crate::store::StoreClient;

#[derive(Clone)]
pub struct AppState {
    pub chatbot_repo: Arc<dyn ChatbotRepository>,
    /// Data reads during prompt assembly and caller team lookup.
    pub store: Arc<dyn StoreClient>,
    pub llm: Arc<dyn LlmClient>,
    /// HS256 secret for caller session tokens; user chat is unavailable
    /// without it.
    pub jwt_secret: Option<String>,
    /// Shared token for the admin inspection and test-chat endpoints.
    pub admin_token: Option<String>,
}

pub fn create_app(state: AppState) -> Router {
    routes::build_router(state)
}
