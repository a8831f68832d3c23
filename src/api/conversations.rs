use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::services::conversation::{get_or_create_conversation, list_conversations};
use crate::services::message::{list_messages, mark_conversation_read, send_message};
use crate::utils::error::AppResult;
use crate::utils::helpers::{extract_user_id, json_list, json_response};

#[derive(Deserialize)]
struct OpenConversationRequest {
    other_user_id: String,
}

#[derive(Deserialize)]
struct SendMessageRequest {
    content: String,
}

async fn open_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<OpenConversationRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let caller_id = extract_user_id(&headers)?;
    let conversation =
        get_or_create_conversation(&state.db, &caller_id, &req.other_user_id).await?;
    Ok(json_response(&conversation))
}

async fn list_conversations_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let caller_id = extract_user_id(&headers)?;
    let summaries = list_conversations(&state.db, &caller_id).await?;
    Ok(json_list(summaries))
}

async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let caller_id = extract_user_id(&headers)?;
    let message = send_message(&state.db, &caller_id, &conversation_id, &req.content).await?;
    Ok(json_response(&message))
}

async fn list_messages_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let caller_id = extract_user_id(&headers)?;
    let messages = list_messages(&state.db, &caller_id, &conversation_id).await?;
    Ok(json_list(messages))
}

async fn mark_read_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let caller_id = extract_user_id(&headers)?;
    let marked = mark_conversation_read(&state.db, &caller_id, &conversation_id).await?;
    Ok(Json(serde_json::json!({ "marked_read": marked })))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(open_conversation))
        .route("/", get(list_conversations_handler))
        .route("/:conversation_id/messages", post(send_message_handler))
        .route("/:conversation_id/messages", get(list_messages_handler))
        .route("/:conversation_id/read", post(mark_read_handler))
        .with_state(state)
}
