use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use hyper::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::auth;
use crate::api::AppState;
use crate::assembly::UserContext;
use crate::assembly::compose::{AssembledPrompt, assemble};
use crate::llm::{Attachment, ChatMessage, GenerateRequest, LlmError};
use crate::store::{ReadQuery, StoreClient};

#[derive(Deserialize)]
pub(crate) struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<ChatMessage>,
    #[serde(default)]
    use_web_search: bool,
    #[serde(default)]
    attachments: Vec<Attachment>,
}

/// POST /api/chatbots/{id}/chat — a chat turn as the logged-in user. The
/// caller's user id comes from the session token, the team id from
/// `business_info`, so data access nodes see exactly this caller's data.
pub(crate) async fn chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ChatRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let claims = auth::verify_session(&headers, state.jwt_secret.as_deref())?;
    validate_message(&body.message)?;

    let team_id = lookup_team(state.store.as_ref(), &claims.sub).await;
    let context = UserContext::new(Some(claims.sub), team_id);

    let assembled = assemble(
        state.chatbot_repo.as_ref(),
        state.store.as_ref(),
        &id,
        Some(&context),
    )
    .await
    .map_err(|e| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    // Attachments only reach the model when the chatbot has an attachments
    // node; web search turns on via the node or an explicit caller request.
    let attachments = if assembled.attachments_enabled {
        body.attachments
    } else {
        Vec::new()
    };
    let web_search = body.use_web_search || assembled.web_search_enabled;

    run_turn(&state, assembled, body.history, body.message, attachments, web_search).await
}

#[derive(Deserialize)]
pub(crate) struct AdminChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<ChatMessage>,
    /// Whose data the bot should see, for admin testing.
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    team_id: Option<String>,
}

/// POST /api/admin/chatbots/{id}/chat — test a chatbot as an arbitrary
/// user/team without a session. No web search and no attachments here; the
/// admin surface exercises prompt assembly, not the full capability set.
pub(crate) async fn admin_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AdminChatRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    auth::verify_admin(&headers, state.admin_token.as_deref())?;
    validate_message(&body.message)?;

    let context = (body.user_id.is_some() || body.team_id.is_some())
        .then(|| UserContext::new(body.user_id, body.team_id));

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

    run_turn(&state, assembled, body.history, body.message, Vec::new(), false).await
}

fn validate_message(message: &str) -> Result<(), (StatusCode, Json<Value>)> {
    if message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "message is required" })),
        ));
    }
    Ok(())
}

async fn run_turn(
    state: &AppState,
    assembled: AssembledPrompt,
    history: Vec<ChatMessage>,
    message: String,
    attachments: Vec<Attachment>,
    web_search: bool,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let request = GenerateRequest {
        model: assembled.chatbot.model_name.clone(),
        system_prompt: assembled.prompt,
        history,
        message,
        attachments,
        web_search,
    };

    let reply = state.llm.generate(request).await.map_err(|e| {
        let status = match e {
            LlmError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        };
        tracing::warn!(chatbot_id = %assembled.chatbot.id, error = %e, "chat turn failed");
        (status, Json(json!({ "error": e.to_string() })))
    })?;

    let mut response = json!({ "reply": reply.text });
    if let Some(thought) = reply.thought_summary {
        response["thought_summary"] = Value::String(thought);
    }
    Ok(Json(response))
}

/// The caller's team, from their business profile. Absent profile or a
/// failed read both mean "no team": data stays user-scoped at most.
async fn lookup_team(store: &dyn StoreClient, user_id: &str) -> Option<String> {
    let query = ReadQuery::new("business_info", &["team_id"]).filter_eq("user_id", user_id);
    match store.read_one(query).await {
        Ok(Some(row)) => row
            .get("team_id")
            .and_then(Value::as_str)
            .map(String::from),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "failed to look up caller team");
            None
        }
    }
}
