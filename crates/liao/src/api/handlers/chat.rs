//! Chat handlers: conversations, transcripts, and the streaming endpoint.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tracing::{error, info, warn};

use crate::auth::CurrentUser;
use crate::chat::{Conversation, ConversationSummary, Message};

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;

/// Terminal marker written after the last fragment.
const DONE_MARKER: &str = "[DONE]";

// ========== Request Types ==========

/// Request body for the streaming endpoint.
///
/// Fields are optional so absence surfaces as a validation error rather than
/// a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChatRequest {
    pub message: Option<String>,
    pub conversation_id: Option<i64>,
}

// ========== Handlers ==========

/// Create a conversation for the current user.
///
/// POST /api/chat/conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Conversation>> {
    let conversation = state.chat.create_conversation(user.id).await?;
    Ok(Json(conversation))
}

/// List the current user's conversations, most recently active first.
///
/// GET /api/chat/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<ConversationSummary>>> {
    let conversations = state.chat.list_conversations(user.id).await?;
    Ok(Json(conversations))
}

/// Full transcript of one of the current user's conversations.
///
/// GET /api/chat/conversations/{conversation_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(conversation_id): Path<i64>,
) -> ApiResult<Json<Vec<Message>>> {
    let messages = state.chat.transcript(user.id, conversation_id).await?;
    Ok(Json(messages))
}

/// Record a user turn and stream the assistant reply.
///
/// POST /api/chat/stream
///
/// The user message and conversation bump are persisted before the channel
/// opens; the assistant message is persisted after the last fragment, or
/// best-effort with whatever was delivered if the client disconnects.
pub async fn stream_chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<StreamChatRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let message = req
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::validation("message and conversationId are required"))?;
    let conversation_id = req
        .conversation_id
        .ok_or_else(|| ApiError::validation("message and conversationId are required"))?;

    // Step 2 of the protocol: both writes land before any streaming starts.
    state
        .chat
        .record_user_turn(user.id, conversation_id, message.clone())
        .await?;

    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(32);
    let chat = state.chat.clone();
    let mut fragments = state.replier.produce(&message);

    tokio::spawn(async move {
        let mut assembled = String::new();
        let mut disconnected = false;

        while let Some(fragment) = fragments.recv().await {
            let payload = json!({ "content": fragment });
            if tx
                .send(Ok(Event::default().data(payload.to_string())))
                .await
                .is_err()
            {
                // Client went away: stop emitting, keep what was delivered.
                warn!(conversation_id, "client disconnected mid-stream");
                disconnected = true;
                break;
            }
            assembled.push_str(&fragment);
        }

        // Finalize (or best-effort persist the partial transcript).
        if !assembled.is_empty() {
            if let Err(e) = chat.record_assistant_turn(conversation_id, assembled).await {
                error!(conversation_id, "persisting assistant turn failed: {e}");
            }
        }

        if !disconnected {
            let _ = tx.send(Ok(Event::default().data(DONE_MARKER))).await;
        }
    });

    info!(user_id = user.id, conversation_id, "stream opened");
    Ok(Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default()))
}
