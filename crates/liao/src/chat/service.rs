//! Conversation service: ownership-checked access to threads and transcripts.

use thiserror::Error;
use tracing::instrument;

use super::models::{Conversation, ConversationSummary, Message, MessageRole, NewMessage};
use super::repository::ChatRepository;

/// Chat service errors.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Referenced conversation does not exist.
    #[error("conversation not found")]
    ConversationNotFound,

    /// Conversation exists but belongs to another user.
    #[error("conversation belongs to another user")]
    NotOwner,

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Service for conversation and transcript operations.
///
/// Every caller-facing operation verifies the caller owns the conversation
/// before touching it.
#[derive(Debug, Clone)]
pub struct ChatService {
    repo: ChatRepository,
}

impl ChatService {
    /// Create a new service over the given repository.
    pub fn new(repo: ChatRepository) -> Self {
        Self { repo }
    }

    /// Create a conversation owned by `user_id`.
    pub async fn create_conversation(&self, user_id: i64) -> Result<Conversation, ChatError> {
        Ok(self.repo.create_conversation(user_id).await?)
    }

    /// List the user's conversations, most recently active first.
    pub async fn list_conversations(
        &self,
        user_id: i64,
    ) -> Result<Vec<ConversationSummary>, ChatError> {
        Ok(self.repo.list_conversations(user_id).await?)
    }

    /// Full transcript of one of the user's conversations.
    pub async fn transcript(
        &self,
        user_id: i64,
        conversation_id: i64,
    ) -> Result<Vec<Message>, ChatError> {
        self.owned_conversation(user_id, conversation_id).await?;
        Ok(self.repo.list_messages(conversation_id).await?)
    }

    /// Persist the user's turn and bump conversation recency.
    ///
    /// Both writes land in one transaction; streaming must not start until
    /// this has returned.
    #[instrument(skip(self, content))]
    pub async fn record_user_turn(
        &self,
        user_id: i64,
        conversation_id: i64,
        content: String,
    ) -> Result<Message, ChatError> {
        self.owned_conversation(user_id, conversation_id).await?;
        Ok(self
            .repo
            .add_message(NewMessage {
                conversation_id,
                role: MessageRole::User,
                content,
            })
            .await?)
    }

    /// Persist the assistant's turn after streaming completes (or aborts).
    ///
    /// No ownership check: the triggering user turn was already verified and
    /// this path is never reachable from a request parameter.
    #[instrument(skip(self, content))]
    pub async fn record_assistant_turn(
        &self,
        conversation_id: i64,
        content: String,
    ) -> Result<Message, ChatError> {
        Ok(self
            .repo
            .add_message(NewMessage {
                conversation_id,
                role: MessageRole::Assistant,
                content,
            })
            .await?)
    }

    async fn owned_conversation(
        &self,
        user_id: i64,
        conversation_id: i64,
    ) -> Result<Conversation, ChatError> {
        let conversation = self
            .repo
            .get_conversation(conversation_id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        if conversation.user_id != user_id {
            return Err(ChatError::NotOwner);
        }

        Ok(conversation)
    }
}
