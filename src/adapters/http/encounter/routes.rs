//! HTTP routes for encounter endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_encounter, list_history, send_message, start_encounter, submit_action, EncounterHandlers,
};

/// Creates the encounter router, mounted at `/api/encounters`.
pub fn encounter_routes(handlers: EncounterHandlers) -> Router {
    Router::new()
        .route("/", post(start_encounter).get(list_history))
        .route("/:id", get(get_encounter))
        .route("/:id/messages", post(send_message))
        .route("/:id/actions", post(submit_action))
        .with_state(handlers)
}
