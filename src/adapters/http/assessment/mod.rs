//! HTTP adapter for the placement quiz.
//!
//! Generation never fails from the caller's point of view: a model failure
//! yields the fallback quiz with `degraded = true`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::assessment::{
    GenerateAssessmentCommand, GenerateAssessmentHandler,
};
use crate::domain::assessment::{Quiz, QuizItem};

#[derive(Clone)]
pub struct AssessmentHandlers {
    generate_handler: Arc<GenerateAssessmentHandler>,
}

impl AssessmentHandlers {
    pub fn new(generate_handler: Arc<GenerateAssessmentHandler>) -> Self {
        Self { generate_handler }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizResponse {
    pub items: Vec<QuizItem>,
    pub degraded: bool,
}

impl From<Quiz> for QuizResponse {
    fn from(quiz: Quiz) -> Self {
        Self {
            items: quiz.items,
            degraded: quiz.degraded,
        }
    }
}

/// POST /api/assessments - Generate a quiz tailored to the learner's profile
pub async fn generate_assessment(
    State(handlers): State<AssessmentHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let quiz = handlers
        .generate_handler
        .handle(GenerateAssessmentCommand::new(user.user_id))
        .await;

    (StatusCode::OK, Json(QuizResponse::from(quiz))).into_response()
}

/// Creates the assessment router, mounted at `/api/assessments`.
pub fn assessment_routes(handlers: AssessmentHandlers) -> Router {
    Router::new()
        .route("/", post(generate_assessment))
        .with_state(handlers)
}
