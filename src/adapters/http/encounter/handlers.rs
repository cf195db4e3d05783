//! HTTP handlers for encounter endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::encounter::{
    GetEncounterError, GetEncounterHandler, GetEncounterQuery, ListEncounterHistoryHandler,
    ListHistoryQuery, StartEncounterCommand, StartEncounterError, StartEncounterHandler,
    SubmitActionCommand, SubmitActionError, SubmitActionHandler, SubmitMessageCommand,
    SubmitMessageError, SubmitMessageHandler,
};
use crate::domain::foundation::{CaseId, DomainError, EncounterId};

use super::dto::{
    ActionResultResponse, EncounterDetailResponse, EncounterResponse, ErrorResponse,
    HistoryItemResponse, MessageExchangeResponse, SendMessageRequest, StartEncounterRequest,
    StartEncounterResponse, SubmitActionRequest, TurnResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct EncounterHandlers {
    start_handler: Arc<StartEncounterHandler>,
    message_handler: Arc<SubmitMessageHandler>,
    action_handler: Arc<SubmitActionHandler>,
    get_handler: Arc<GetEncounterHandler>,
    history_handler: Arc<ListEncounterHistoryHandler>,
}

impl EncounterHandlers {
    pub fn new(
        start_handler: Arc<StartEncounterHandler>,
        message_handler: Arc<SubmitMessageHandler>,
        action_handler: Arc<SubmitActionHandler>,
        get_handler: Arc<GetEncounterHandler>,
        history_handler: Arc<ListEncounterHistoryHandler>,
    ) -> Self {
        Self {
            start_handler,
            message_handler,
            action_handler,
            get_handler,
            history_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/encounters - Open an encounter on a case
pub async fn start_encounter(
    State(handlers): State<EncounterHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<StartEncounterRequest>,
) -> Response {
    let case_id = match req.case_id.parse::<CaseId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid case ID")),
            )
                .into_response()
        }
    };

    let cmd = StartEncounterCommand::new(user.user_id, case_id);

    match handlers.start_handler.handle(cmd).await {
        Ok(result) => {
            let response = StartEncounterResponse {
                encounter: EncounterResponse::from(&result.session),
                opening_turn: TurnResponse::from(&result.opening_turn),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_start_error(e),
    }
}

/// GET /api/encounters - The learner's history, newest first
pub async fn list_history(
    State(handlers): State<EncounterHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let query = ListHistoryQuery {
        user_id: user.user_id,
    };

    match handlers.history_handler.handle(query).await {
        Ok(items) => {
            let response: Vec<HistoryItemResponse> =
                items.into_iter().map(HistoryItemResponse::from).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_infrastructure_error(e),
    }
}

/// GET /api/encounters/:id - Transcript, actions and case content
pub async fn get_encounter(
    State(handlers): State<EncounterHandlers>,
    RequireAuth(user): RequireAuth,
    Path(encounter_id): Path<String>,
) -> Response {
    let encounter_id = match parse_encounter_id(&encounter_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let query = GetEncounterQuery::new(user.user_id, encounter_id);

    match handlers.get_handler.handle(query).await {
        Ok(view) => {
            let response = EncounterDetailResponse::from(view);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(GetEncounterError::NotFound(id)) => encounter_not_found(&id),
        Err(GetEncounterError::Repository(msg)) => internal_error(msg),
    }
}

/// POST /api/encounters/:id/messages - One doctor/patient exchange
pub async fn send_message(
    State(handlers): State<EncounterHandlers>,
    RequireAuth(user): RequireAuth,
    Path(encounter_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let encounter_id = match parse_encounter_id(&encounter_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = SubmitMessageCommand::new(user.user_id, encounter_id, req.content);

    match handlers.message_handler.handle(cmd).await {
        Ok(result) => {
            let response = MessageExchangeResponse::from(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_message_error(e),
    }
}

/// POST /api/encounters/:id/actions - Record an action, closing on the final diagnosis
pub async fn submit_action(
    State(handlers): State<EncounterHandlers>,
    RequireAuth(user): RequireAuth,
    Path(encounter_id): Path<String>,
    Json(req): Json<SubmitActionRequest>,
) -> Response {
    let encounter_id = match parse_encounter_id(&encounter_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = SubmitActionCommand::new(user.user_id, encounter_id, req.action_type, req.details);

    match handlers.action_handler.handle(cmd).await {
        Ok(result) => {
            let response = ActionResultResponse::from(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_action_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

fn parse_encounter_id(raw: &str) -> Result<EncounterId, Response> {
    raw.parse::<EncounterId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid encounter ID")),
        )
            .into_response()
    })
}

fn encounter_not_found(id: &EncounterId) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found("Encounter", &id.to_string())),
    )
        .into_response()
}

fn case_not_found(id: &CaseId) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found("Case", &id.to_string())),
    )
        .into_response()
}

fn encounter_closed(message: &str) -> Response {
    (StatusCode::CONFLICT, Json(ErrorResponse::conflict(message))).into_response()
}

fn internal_error(msg: String) -> Response {
    tracing::error!(error = %msg, "encounter request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal("Internal server error")),
    )
        .into_response()
}

fn handle_infrastructure_error(error: DomainError) -> Response {
    internal_error(error.to_string())
}

fn handle_start_error(error: StartEncounterError) -> Response {
    match error {
        StartEncounterError::CaseNotFound(id) => case_not_found(&id),
        StartEncounterError::Repository(msg) => internal_error(msg),
    }
}

fn handle_message_error(error: SubmitMessageError) -> Response {
    match error {
        SubmitMessageError::EmptyContent => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Message content cannot be empty")),
        )
            .into_response(),
        SubmitMessageError::NotFound(id) => encounter_not_found(&id),
        SubmitMessageError::EncounterClosed => {
            encounter_closed("Encounter is closed and accepts no further messages")
        }
        SubmitMessageError::CaseNotFound(id) => case_not_found(&id),
        SubmitMessageError::Repository(msg) => internal_error(msg),
    }
}

fn handle_action_error(error: SubmitActionError) -> Response {
    match error {
        SubmitActionError::EmptyActionType => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Action type cannot be empty")),
        )
            .into_response(),
        SubmitActionError::NotFound(id) => encounter_not_found(&id),
        SubmitActionError::EncounterClosed => {
            encounter_closed("Encounter is closed and accepts no further actions")
        }
        SubmitActionError::CaseNotFound(id) => case_not_found(&id),
        SubmitActionError::Repository(msg) => internal_error(msg),
    }
}
