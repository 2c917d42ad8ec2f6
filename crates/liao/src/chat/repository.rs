//! Repository for conversation and message database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::{Conversation, ConversationSummary, Message, NewMessage};

/// Placeholder title for a freshly created conversation.
pub const DEFAULT_TITLE: &str = "新对话";

const CONVERSATION_COLUMNS: &str = "id, user_id, title, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, conversation_id, role, content, created_at";

/// Repository for chat database operations.
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    /// Create a new chat repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new conversation with the default title.
    #[instrument(skip(self))]
    pub async fn create_conversation(&self, user_id: i64) -> Result<Conversation> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO conversations (user_id, title)
            VALUES (?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(DEFAULT_TITLE)
        .fetch_one(&self.pool)
        .await
        .context("inserting conversation")?;

        self.get_conversation(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("conversation not found after creation"))
    }

    /// Get a conversation by ID.
    pub async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>> {
        sqlx::query_as::<_, Conversation>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching conversation")
    }

    /// List a user's conversations, most recently active first, each with the
    /// earliest message as a preview.
    pub async fn list_conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>> {
        sqlx::query_as::<_, ConversationSummary>(
            r#"
            SELECT c.id, c.user_id, c.title, c.created_at, c.updated_at,
                   (SELECT m.content FROM messages m
                    WHERE m.conversation_id = c.id
                    ORDER BY m.created_at ASC, m.id ASC
                    LIMIT 1) AS first_message
            FROM conversations c
            WHERE c.user_id = ?
            ORDER BY c.updated_at DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("listing conversations")
    }

    /// Full transcript of a conversation in replay order.
    pub async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .context("listing messages")
    }

    /// Persist one message and bump the conversation's recency, atomically.
    #[instrument(skip(self, message), fields(conversation_id = message.conversation_id))]
    pub async fn add_message(&self, message: NewMessage) -> Result<Message> {
        let mut tx = self.pool.begin().await.context("beginning transaction")?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO messages (conversation_id, role, content)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(message.conversation_id)
        .bind(message.role)
        .bind(&message.content)
        .fetch_one(&mut *tx)
        .await
        .context("inserting message")?;

        sqlx::query("UPDATE conversations SET updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now') WHERE id = ?")
            .bind(message.conversation_id)
            .execute(&mut *tx)
            .await
            .context("bumping conversation recency")?;

        tx.commit().await.context("committing message write")?;

        self.get_message(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("message not found after creation"))
    }

    /// Get a message by ID.
    pub async fn get_message(&self, id: i64) -> Result<Option<Message>> {
        sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching message")
    }
}
