//! Chat module: conversations, messages, and reply production.

mod models;
mod reply;
mod repository;
mod service;

pub use models::{Conversation, ConversationSummary, Message, MessageRole, NewMessage};
pub use reply::{ReplyProducer, ScriptedReplier};
pub use repository::ChatRepository;
pub use service::{ChatError, ChatService};
