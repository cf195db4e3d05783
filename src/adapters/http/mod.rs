//! HTTP adapters - REST API implementations.
//!
//! Each module exposes its own router; [`api_router`] mounts them under
//! `/api` behind the identity middleware.

pub mod assessment;
pub mod encounter;
pub mod middleware;

use axum::{middleware as axum_middleware, Router};

pub use assessment::{assessment_routes, AssessmentHandlers};
pub use encounter::{encounter_routes, EncounterHandlers};
pub use middleware::{identity_middleware, AuthenticatedUser, RequireAuth, USER_ID_HEADER};

/// Builds the complete API router.
///
/// # Routes
///
/// - `POST /api/encounters` - Open an encounter
/// - `GET /api/encounters` - Learner history
/// - `GET /api/encounters/:id` - Encounter detail
/// - `POST /api/encounters/:id/messages` - Send a message to the patient
/// - `POST /api/encounters/:id/actions` - Record an action
/// - `POST /api/assessments` - Generate a placement quiz
pub fn api_router(encounters: EncounterHandlers, assessments: AssessmentHandlers) -> Router {
    let api = Router::new()
        .nest("/encounters", encounter_routes(encounters))
        .nest("/assessments", assessment_routes(assessments));

    Router::new()
        .nest("/api", api)
        .layer(axum_middleware::from_fn(identity_middleware))
}
