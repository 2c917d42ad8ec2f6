//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthState, CodeStore, InMemoryCodeStore};
use crate::chat::{ChatRepository, ChatService, ReplyProducer, ScriptedReplier};
use crate::config::AppConfig;
use crate::db::Database;
use crate::user::UserRepository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// User repository.
    pub users: UserRepository,
    /// Conversation service.
    pub chat: ChatService,
    /// Authentication state.
    pub auth: AuthState,
    /// Pending verification codes.
    pub codes: Arc<dyn CodeStore>,
    /// Reply fragment producer for the streaming endpoint.
    pub replier: Arc<dyn ReplyProducer>,
    /// Verification code lifetime.
    pub code_ttl: Duration,
    /// Whether send-code responses echo the generated code.
    pub expose_code: bool,
}

impl AppState {
    /// Create application state from configuration and an open database.
    pub fn new(config: &AppConfig, db: Database) -> Self {
        let replier = ScriptedReplier::new(Duration::from_millis(config.stream.fragment_delay_ms));
        Self::with_replier(config, db, Arc::new(replier))
    }

    /// Create application state with a custom reply producer.
    pub fn with_replier(
        config: &AppConfig,
        db: Database,
        replier: Arc<dyn ReplyProducer>,
    ) -> Self {
        let pool = db.pool().clone();

        Self {
            db,
            users: UserRepository::new(pool.clone()),
            chat: ChatService::new(ChatRepository::new(pool)),
            auth: AuthState::new(&config.auth.jwt_secret, config.auth.token_ttl_secs),
            codes: Arc::new(InMemoryCodeStore::new()),
            replier,
            code_ttl: Duration::from_secs(config.auth.code_ttl_secs),
            expose_code: config.auth.expose_code,
        }
    }
}
