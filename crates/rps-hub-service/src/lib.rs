//! RPS Hub Service
//!
//! HTTP front for the hub. Callers identify themselves with the
//! `X-Account-Id` header; every operation runs under one lock on the hub.

pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use handlers::*;
pub use config::ServiceConfig;
pub use state::AppState;

/// Build the router over the given state
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Admin
        .route("/api/config", get(get_config))
        .route("/api/admin/expiration", post(change_expiration_period))
        .route("/api/engines", post(create_engine))
        // Ledger
        .route("/api/deposit", post(deposit))
        .route("/api/withdraw", post(withdraw))
        .route("/api/balances/:account", get(get_balance))
        // Helpers
        .route("/api/session-id", post(compute_session_id))
        .route("/api/move-hash", post(compute_move_hash))
        // Sessions
        .route("/api/engines/:engine/sessions", post(init_session))
        .route("/api/engines/:engine/sessions/:session", get(get_session))
        .route(
            "/api/engines/:engine/sessions/:session/accept",
            post(accept_session),
        )
        .route(
            "/api/engines/:engine/sessions/:session/reveal",
            post(reveal_session_move),
        )
        .route(
            "/api/engines/:engine/sessions/:session/cancel",
            post(cancel_session),
        )
        // Audit
        .route("/api/events", get(list_events))
        // System
        .route("/api/system/tick", post(tick))
        // Health
        .route("/api/health", get(health))
        .layer(cors)
        .with_state(state)
}
