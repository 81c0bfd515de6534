use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use hyper::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::AppState;
use crate::api::auth;
use crate::assembly::UserContext;
use crate::assembly::compose::assemble;

#[derive(Deserialize)]
pub(crate) struct PromptQuery {
    user_id: Option<String>,
    team_id: Option<String>,
}

/// GET /api/admin/chatbots/{id}/prompt — the structured assembly breakdown:
/// base prompt, instruction blocks, data modules, capability flags, and the
/// full joined prompt. With `user_id`/`team_id` query params, data modules
/// show what that caller's prompt would contain.
pub(crate) async fn prompt_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PromptQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    auth::verify_admin(&headers, state.admin_token.as_deref())?;

    let context = (params.user_id.is_some() || params.team_id.is_some())
        .then(|| UserContext::new(params.user_id, params.team_id));

    let assembled = assemble(
        state.chatbot_repo.as_ref(),
        state.store.as_ref(),
        &id,
        context.as_ref(),
    )
    .await
    .map_err(|e| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    Ok(Json(serde_json::to_value(&assembled).unwrap()))
}

/// GET /api/admin/chatbots/{id}/nodes — the chatbot's linked nodes with
/// registry defaults already overlaid, for inspection.
pub(crate) async fn list_nodes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    auth::verify_admin(&headers, state.admin_token.as_deref())?;

    let nodes = state.chatbot_repo.linked_nodes(&id).await;
    Ok(Json(json!({ "nodes": nodes })))
}
