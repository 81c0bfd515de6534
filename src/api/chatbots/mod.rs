pub mod handlers;

use axum::Router;
use axum::routing::get;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/chatbots/{id}/prompt", get(handlers::prompt_preview))
        .route("/admin/chatbots/{id}/nodes", get(handlers::list_nodes))
}
