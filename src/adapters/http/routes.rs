//! Route definitions for the intake endpoints.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{billing_assistant, chat, create_lead, health, IntakeAppState};

/// Create the intake router with all endpoints.
///
/// # Endpoints
///
/// - `POST /api/leads` - Create a lead record
/// - `POST /api/chat` - Process one conversational turn
/// - `POST /api/billing/assistant` - Draft invoice items from a prompt
/// - `GET /health` - Liveness probe
pub fn intake_router(state: IntakeAppState) -> Router {
    Router::new()
        .route("/api/leads", post(create_lead))
        .route("/api/chat", post(chat))
        .route("/api/billing/assistant", post(billing_assistant))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
