//! API route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::auth_middleware;

use super::handlers;
use super::handlers::{chat, users};
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();

    // Public routes: token issuance and account recovery.
    let user_routes = Router::new()
        .route("/login", post(users::login))
        .route("/phone-login", post(users::phone_login))
        .route("/send-code", post(users::send_code))
        .route("/reset-password", post(users::reset_password))
        .route("/check-exists", get(users::check_exists));

    // Protected routes: everything here requires a valid bearer token.
    let chat_routes = Router::new()
        .route(
            "/conversations",
            post(chat::create_conversation).get(chat::list_conversations),
        )
        .route(
            "/conversations/{conversation_id}/messages",
            get(chat::list_messages),
        )
        .route("/stream", post(chat::stream_chat))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/users", user_routes)
        .nest("/api/chat", chat_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
