//! HTTP DTOs for encounter endpoints.
//!
//! These types decouple the HTTP API from domain types. History items keep
//! the field names the learner dashboard already consumes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::handlers::encounter::{
    EncounterView, HistoryItem, SubmitActionResult, SubmitMessageResult,
};
use crate::domain::clinical::ClinicalCase;
use crate::domain::encounter::{
    EncounterEvaluation, EncounterSession, MasteryLevel, RecordedAction, RimeDetails, RimeScores,
    Turn, TurnRole,
};
use crate::domain::foundation::{EncounterStatus, Timestamp};

fn rfc3339(ts: &Timestamp) -> String {
    ts.as_datetime().to_rfc3339()
}

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to open an encounter on a case.
#[derive(Debug, Clone, Deserialize)]
pub struct StartEncounterRequest {
    #[serde(alias = "case_uuid")]
    pub case_id: String,
}

/// A learner utterance. A missing field is treated as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
}

/// A learner action, closing or not.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitActionRequest {
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Encounter session as exposed over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterResponse {
    pub id: String,
    pub case_id: String,
    pub status: EncounterStatus,
    pub global_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rime_details: Option<RimeDetails>,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

impl From<&EncounterSession> for EncounterResponse {
    fn from(session: &EncounterSession) -> Self {
        Self {
            id: session.id().to_string(),
            case_id: session.case_id().to_string(),
            status: session.status(),
            global_score: session.global_score(),
            rime_details: session.rime_details().cloned(),
            started_at: rfc3339(session.started_at()),
            ended_at: session.ended_at().map(rfc3339),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub id: String,
    pub role: TurnRole,
    pub content: String,
    pub created_at: String,
}

impl From<&Turn> for TurnResponse {
    fn from(turn: &Turn) -> Self {
        Self {
            id: turn.id().to_string(),
            role: turn.role(),
            content: turn.content().to_string(),
            created_at: rfc3339(turn.created_at()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub id: String,
    pub action_type: String,
    pub details: Map<String, Value>,
    pub created_at: String,
}

impl From<&RecordedAction> for ActionResponse {
    fn from(action: &RecordedAction) -> Self {
        Self {
            id: action.id().to_string(),
            action_type: action.action_type().as_str().to_string(),
            details: action.details().clone(),
            created_at: rfc3339(action.created_at()),
        }
    }
}

/// Response to `POST /api/encounters`.
#[derive(Debug, Clone, Serialize)]
pub struct StartEncounterResponse {
    pub encounter: EncounterResponse,
    pub opening_turn: TurnResponse,
}

/// Response to a learner message: both persisted turns.
#[derive(Debug, Clone, Serialize)]
pub struct MessageExchangeResponse {
    pub doctor_message: TurnResponse,
    pub patient_message: TurnResponse,
    pub degraded: bool,
}

impl From<SubmitMessageResult> for MessageExchangeResponse {
    fn from(result: SubmitMessageResult) -> Self {
        Self {
            doctor_message: TurnResponse::from(&result.doctor_turn),
            patient_message: TurnResponse::from(&result.patient_turn),
            degraded: result.degraded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResponse {
    pub global_score: f64,
    pub rime_details: RimeScores,
    pub feedback_text: String,
    pub degraded: bool,
}

impl From<EncounterEvaluation> for EvaluationResponse {
    fn from(evaluation: EncounterEvaluation) -> Self {
        Self {
            global_score: evaluation.global_score,
            rime_details: evaluation.rime_details,
            feedback_text: evaluation.feedback_text,
            degraded: evaluation.degraded,
        }
    }
}

/// Response to a learner action. `evaluation` is present only when the
/// action closed the encounter.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResultResponse {
    pub action: ActionResponse,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResponse>,
}

impl From<SubmitActionResult> for ActionResultResponse {
    fn from(result: SubmitActionResult) -> Self {
        Self {
            action: ActionResponse::from(&result.action),
            closed: result.closed,
            evaluation: result.evaluation.map(EvaluationResponse::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseResponse {
    pub id: String,
    pub title: String,
    pub specialty: String,
    pub content: Value,
}

impl From<ClinicalCase> for CaseResponse {
    fn from(case: ClinicalCase) -> Self {
        Self {
            id: case.id.to_string(),
            title: case.title,
            specialty: case.specialty,
            content: case.content.to_value(),
        }
    }
}

/// Full transcript view of one encounter.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterDetailResponse {
    pub encounter: EncounterResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<CaseResponse>,
    pub turns: Vec<TurnResponse>,
    pub actions: Vec<ActionResponse>,
}

impl From<EncounterView> for EncounterDetailResponse {
    fn from(view: EncounterView) -> Self {
        Self {
            encounter: EncounterResponse::from(&view.session),
            case: view.case.map(CaseResponse::from),
            turns: view.turns.iter().map(TurnResponse::from).collect(),
            actions: view.actions.iter().map(ActionResponse::from).collect(),
        }
    }
}

/// One row of the learner's history table.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItemResponse {
    pub id: String,
    #[serde(rename = "casClinique")]
    pub case_title: String,
    #[serde(rename = "type")]
    pub specialty: String,
    pub date: String,
    #[serde(rename = "scoreRIME")]
    pub score: i64,
    #[serde(rename = "statut")]
    pub mastery: MasteryLevel,
    pub status: EncounterStatus,
}

impl From<HistoryItem> for HistoryItemResponse {
    fn from(item: HistoryItem) -> Self {
        Self {
            id: item.encounter_id.to_string(),
            case_title: item.case_title,
            specialty: item.case_specialty,
            date: item.started_at,
            score: item.score,
            mastery: item.mastery,
            status: item.status,
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: "ENCOUNTER_CLOSED".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::encounter::ActionType;
    use crate::domain::foundation::{CaseId, EncounterId, UserId};
    use serde_json::json;

    mod requests {
        use super::*;

        #[test]
        fn start_request_accepts_legacy_case_uuid_key() {
            let id = CaseId::new().to_string();
            let req: StartEncounterRequest =
                serde_json::from_value(json!({ "case_uuid": id })).unwrap();
            assert_eq!(req.case_id, id);
        }

        #[test]
        fn message_request_defaults_missing_content_to_empty() {
            let req: SendMessageRequest = serde_json::from_value(json!({})).unwrap();
            assert!(req.content.is_empty());
        }

        #[test]
        fn action_request_defaults_details() {
            let req: SubmitActionRequest =
                serde_json::from_value(json!({ "action_type": "EXAMEN" })).unwrap();
            assert_eq!(req.action_type, "EXAMEN");
            assert!(req.details.is_empty());
        }
    }

    mod responses {
        use super::*;

        #[test]
        fn history_item_uses_dashboard_keys() {
            let item = HistoryItem {
                encounter_id: EncounterId::new(),
                case_title: "Douleur thoracique".to_string(),
                case_specialty: "Cardiologie".to_string(),
                started_at: "2024-03-07 14:05".to_string(),
                score: 82,
                mastery: MasteryLevel::Acquired,
                status: EncounterStatus::Closed,
            };

            let json = serde_json::to_value(HistoryItemResponse::from(item)).unwrap();

            assert_eq!(json["casClinique"], "Douleur thoracique");
            assert_eq!(json["type"], "Cardiologie");
            assert_eq!(json["date"], "2024-03-07 14:05");
            assert_eq!(json["scoreRIME"], 82);
            assert_eq!(json["statut"], "ACQUISE");
            assert_eq!(json["status"], "closed");
        }

        #[test]
        fn open_encounter_omits_rime_details_and_end() {
            let session = EncounterSession::start(UserId::new("u").unwrap(), CaseId::new());

            let json = serde_json::to_value(EncounterResponse::from(&session)).unwrap();

            assert_eq!(json["status"], "open");
            assert_eq!(json["global_score"], 0.0);
            assert!(json.get("rime_details").is_none());
            assert!(json.get("ended_at").is_none());
        }

        #[test]
        fn non_closing_action_result_omits_evaluation() {
            let action = RecordedAction::new(
                EncounterId::new(),
                ActionType::new("EXAMEN").unwrap(),
                Map::new(),
            );
            let result = SubmitActionResult {
                action,
                closed: false,
                evaluation: None,
            };

            let json = serde_json::to_value(ActionResultResponse::from(result)).unwrap();

            assert_eq!(json["closed"], false);
            assert!(json.get("evaluation").is_none());
            assert_eq!(json["action"]["action_type"], "EXAMEN");
        }
    }
}
