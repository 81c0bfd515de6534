pub mod handlers;

use axum::Router;
use axum::routing::post;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chatbots/{id}/chat", post(handlers::chat))
        .route("/admin/chatbots/{id}/chat", post(handlers::admin_chat))
}
