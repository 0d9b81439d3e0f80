//! REST surface for a dialogue session.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::dialogue::Input;
use crate::error::InputError;
use crate::session::DialogueSession;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct DialogueRouteState {
    pub session: Arc<DialogueSession>,
}

/// Build the Axum router for the dialogue REST endpoints.
pub fn dialogue_routes(session: Arc<DialogueSession>) -> Router {
    let state = DialogueRouteState { session };

    Router::new()
        .route("/health", get(health))
        .route("/api/dialogue", get(get_dialogue))
        .route("/api/dialogue/input", post(post_input))
        .route("/api/dialogue/restart", post(post_restart))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "geotextile-assist"
    }))
}

// ── Dialogue ────────────────────────────────────────────────────────────

async fn get_dialogue(State(state): State<DialogueRouteState>) -> impl IntoResponse {
    Json(state.session.snapshot().await)
}

/// Either `{"choice": n}` (zero-based) or `{"text": "..."}`.
#[derive(Debug, Deserialize)]
struct InputRequest {
    choice: Option<usize>,
    text: Option<String>,
}

async fn post_input(
    State(state): State<DialogueRouteState>,
    Json(body): Json<InputRequest>,
) -> impl IntoResponse {
    let input = match (body.choice, body.text) {
        (Some(index), None) => Input::Choice(index),
        (None, Some(text)) => Input::Text(text),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Send exactly one of `choice` or `text`"})),
            );
        }
    };

    match state.session.submit(input).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!(state.session.snapshot().await)),
        ),
        Err(e) => {
            debug!(error = %e, "Dialogue input rejected");
            let status = match e {
                InputError::NotAcceptingInput { .. } => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            (status, Json(serde_json::json!({"error": e.to_string()})))
        }
    }
}

async fn post_restart(State(state): State<DialogueRouteState>) -> impl IntoResponse {
    state.session.restart().await;
    info!(session_id = %state.session.id(), "Dialogue restarted over HTTP");
    Json(state.session.snapshot().await)
}
