use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde_json::{Value, json};

use super::{
    Attachment, ChatRole, GenerateReply, GenerateRequest, LlmClient, LlmError, MAX_HISTORY_TURNS,
};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Fixed acknowledgement turn that anchors the system prompt at the start of
/// the conversation (the generateContent API has no system role).
const MODEL_ACK: &str = "I understand and will follow these instructions.";

/// Client for the Gemini `generateContent` REST API.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: API_BASE.to_string(),
        }
    }

    /// Fetch an image and wrap it as an inline-data part. Unreachable or
    /// non-image URLs drop the attachment rather than failing the turn.
    async fn image_part(&self, url: &str) -> Option<Value> {
        let resp = match self.client.get(url).header("Accept", "image/*").send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::warn!(url, status = %resp.status(), "image attachment fetch failed");
                return None;
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "image attachment fetch failed");
                return None;
            }
        };
        let mime_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "image/png".to_string());
        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(url, error = %e, "image attachment read failed");
                return None;
            }
        };
        Some(json!({
            "inlineData": { "mimeType": mime_type, "data": BASE64.encode(&bytes) }
        }))
    }
}

/// Conversation contents: system prompt pair, capped history, then the user
/// message with any attachment parts.
fn build_contents(request: &GenerateRequest, attachment_parts: Vec<Value>) -> Vec<Value> {
    let mut contents = vec![
        json!({ "role": "user", "parts": [{ "text": request.system_prompt }] }),
        json!({ "role": "model", "parts": [{ "text": MODEL_ACK }] }),
    ];

    let recent = request
        .history
        .iter()
        .skip(request.history.len().saturating_sub(MAX_HISTORY_TURNS));
    for message in recent {
        if message.content.is_empty() {
            continue;
        }
        let role = match message.role {
            ChatRole::User => "user",
            ChatRole::Model | ChatRole::Assistant => "model",
        };
        contents.push(json!({ "role": role, "parts": [{ "text": message.content }] }));
    }

    let mut last_parts = vec![json!({ "text": request.message })];
    last_parts.extend(attachment_parts);
    contents.push(json!({ "role": "user", "parts": last_parts }));
    contents
}

fn build_payload(model: &str, contents: Vec<Value>, web_search: bool) -> Value {
    let mut generation_config = json!({
        "maxOutputTokens": 2048,
        "temperature": 0.4,
    });
    // 2.5-family models default to extended thinking; turn it off.
    if model.contains("2.5") {
        generation_config["thinkingConfig"] = json!({
            "thinkingBudget": 0,
            "includeThoughts": false,
        });
    }

    let mut payload = json!({
        "contents": contents,
        "generationConfig": generation_config,
    });
    if web_search {
        payload["tools"] = json!([{ "google_search": {} }]);
    }
    payload
}

/// Split the reply's parts into answer text and thought summary.
fn parse_reply(body: &Value) -> Result<GenerateReply, LlmError> {
    let parts = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.pointer("/content/parts"))
        .and_then(Value::as_array)
        .ok_or(LlmError::EmptyResponse)?;

    let mut text = String::new();
    let mut thought_summary = String::new();
    for part in parts {
        let Some(part_text) = part.get("text").and_then(Value::as_str) else {
            continue;
        };
        if part.get("thought").and_then(Value::as_bool).unwrap_or(false) {
            thought_summary.push_str(part_text);
        } else {
            text.push_str(part_text);
        }
    }

    let thought_summary = thought_summary.trim();
    Ok(GenerateReply {
        text: text.trim().to_string(),
        thought_summary: (!thought_summary.is_empty()).then(|| thought_summary.to_string()),
    })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply, LlmError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(LlmError::NotConfigured);
        };
        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string();

        let mut attachment_parts = Vec::new();
        for attachment in &request.attachments {
            match attachment {
                Attachment::Image { url } => {
                    if let Some(part) = self.image_part(url).await {
                        attachment_parts.push(part);
                    }
                }
                Attachment::Document { text, file_name } => {
                    attachment_parts.push(json!({
                        "text": format!("[Attachment: {file_name}]\n{text}")
                    }));
                }
            }
        }

        let contents = build_contents(&request, attachment_parts);
        let payload = build_payload(&model, contents, request.web_search);

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        parse_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    fn request(history: Vec<ChatMessage>, web_search: bool) -> GenerateRequest {
        GenerateRequest {
            model: None,
            system_prompt: "You are a support agent.".into(),
            history,
            message: "What are my tasks?".into(),
            attachments: vec![],
            web_search,
        }
    }

    fn message(role: ChatRole, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.into(),
        }
    }

    #[test]
    fn contents_start_with_system_prompt_pair() {
        let contents = build_contents(&request(vec![], false), vec![]);
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "You are a support agent.");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], MODEL_ACK);
        assert_eq!(contents[2]["parts"][0]["text"], "What are my tasks?");
    }

    #[test]
    fn assistant_role_maps_to_model_and_empty_turns_drop() {
        let contents = build_contents(
            &request(
                vec![
                    message(ChatRole::User, "hi"),
                    message(ChatRole::Assistant, "hello"),
                    message(ChatRole::Model, ""),
                ],
                false,
            ),
            vec![],
        );
        // system pair + 2 surviving history turns + final message
        assert_eq!(contents.len(), 5);
        assert_eq!(contents[3]["role"], "model");
        assert_eq!(contents[3]["parts"][0]["text"], "hello");
    }

    #[test]
    fn history_is_capped_to_most_recent_turns() {
        let history: Vec<ChatMessage> = (0..40)
            .map(|i| message(ChatRole::User, &format!("turn {i}")))
            .collect();
        let contents = build_contents(&request(history, false), vec![]);
        assert_eq!(contents.len(), 2 + MAX_HISTORY_TURNS + 1);
        assert_eq!(contents[2]["parts"][0]["text"], "turn 10");
    }

    #[test]
    fn attachment_parts_follow_the_message_text() {
        let contents = build_contents(
            &request(vec![], false),
            vec![json!({ "text": "[Attachment: sops.pdf]\nextracted" })],
        );
        let last = contents.last().unwrap();
        assert_eq!(last["parts"][0]["text"], "What are my tasks?");
        assert_eq!(last["parts"][1]["text"], "[Attachment: sops.pdf]\nextracted");
    }

    #[test]
    fn web_search_toggles_the_tool() {
        let with = build_payload(DEFAULT_MODEL, vec![], true);
        assert_eq!(with["tools"][0], json!({ "google_search": {} }));

        let without = build_payload(DEFAULT_MODEL, vec![], false);
        assert!(without.get("tools").is_none());
    }

    #[test]
    fn thinking_config_only_for_25_models() {
        let flash = build_payload("gemini-2.5-flash", vec![], false);
        assert_eq!(
            flash["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            0
        );

        let preview = build_payload("gemini-3-flash-preview", vec![], false);
        assert!(
            preview["generationConfig"]
                .get("thinkingConfig")
                .is_none()
        );
        assert_eq!(preview["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn reply_splits_thought_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "mulling it over", "thought": true },
                        { "text": "You have two tasks. " },
                        { "text": "Both due Friday." },
                    ]
                }
            }]
        });
        let reply = parse_reply(&body).unwrap();
        assert_eq!(reply.text, "You have two tasks. Both due Friday.");
        assert_eq!(reply.thought_summary.as_deref(), Some("mulling it over"));
    }

    #[test]
    fn reply_without_candidates_is_empty_response() {
        assert!(matches!(
            parse_reply(&json!({ "candidates": [] })),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(parse_reply(&json!({})), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn reply_without_thoughts_has_no_summary() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Done." }] } }]
        });
        let reply = parse_reply(&body).unwrap();
        assert_eq!(reply.text, "Done.");
        assert!(reply.thought_summary.is_none());
    }
}
