//! SubmitActionHandler - records an action and, for the closing action,
//! runs the end-of-encounter transition.
//!
//! Closing is one logical unit: evaluate the full transcript and the action
//! log including the closing action, then write that action together with
//! status, end time, score and per-axis mapping in a single store update. A
//! closing that loses a race leaves nothing behind. Evaluation cannot fail
//! (zero-report fallback), so the transition never blocks on the model.

use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::application::handlers::assessment::EncounterEvaluator;
use crate::domain::encounter::{ActionType, EncounterEvaluation, RecordedAction, TurnRole};
use crate::domain::foundation::{CaseId, DomainError, EncounterId, ErrorCode, UserId};
use crate::ports::{CaseCatalog, EncounterRepository};

/// Command to record an action.
#[derive(Debug, Clone)]
pub struct SubmitActionCommand {
    pub user_id: UserId,
    pub encounter_id: EncounterId,
    pub action_type: String,
    pub details: Map<String, Value>,
}

impl SubmitActionCommand {
    pub fn new(
        user_id: UserId,
        encounter_id: EncounterId,
        action_type: impl Into<String>,
        details: Map<String, Value>,
    ) -> Self {
        Self {
            user_id,
            encounter_id,
            action_type: action_type.into(),
            details,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmitActionResult {
    pub action: RecordedAction,
    pub closed: bool,
    /// Present iff `closed`.
    pub evaluation: Option<EncounterEvaluation>,
}

#[derive(Debug, Clone, Error)]
pub enum SubmitActionError {
    #[error("Validation error: action type cannot be empty")]
    EmptyActionType,

    #[error("Encounter not found: {0}")]
    NotFound(EncounterId),

    /// Any action after closure, closing or not.
    #[error("Encounter is closed and accepts no further actions")]
    EncounterClosed,

    #[error("Case not found: {0}")]
    CaseNotFound(CaseId),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for SubmitActionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::EncounterClosed => SubmitActionError::EncounterClosed,
            _ => SubmitActionError::Repository(err.to_string()),
        }
    }
}

/// Handler for learner actions.
pub struct SubmitActionHandler {
    repository: Arc<dyn EncounterRepository>,
    catalog: Arc<dyn CaseCatalog>,
    evaluator: Arc<EncounterEvaluator>,
}

impl SubmitActionHandler {
    pub fn new(
        repository: Arc<dyn EncounterRepository>,
        catalog: Arc<dyn CaseCatalog>,
        evaluator: Arc<EncounterEvaluator>,
    ) -> Self {
        Self {
            repository,
            catalog,
            evaluator,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitActionCommand,
    ) -> Result<SubmitActionResult, SubmitActionError> {
        let action_type =
            ActionType::new(cmd.action_type).map_err(|_| SubmitActionError::EmptyActionType)?;

        let mut session = self
            .repository
            .load_session(&cmd.encounter_id, &cmd.user_id)
            .await?
            .ok_or(SubmitActionError::NotFound(cmd.encounter_id))?;
        session.ensure_open()?;

        // Fetched before any write so a dangling case leaves nothing behind.
        let case = if action_type.is_closing() {
            Some(
                self.catalog
                    .get_case_content(session.case_id())
                    .await?
                    .ok_or(SubmitActionError::CaseNotFound(*session.case_id()))?,
            )
        } else {
            None
        };

        let Some(case) = case else {
            let action = self
                .repository
                .append_action(session.id(), &action_type, &cmd.details)
                .await?;
            return Ok(SubmitActionResult {
                action,
                closed: false,
                evaluation: None,
            });
        };

        // Closing transition: the evaluator sees the closing action before it is stored.
        let action = RecordedAction::new(*session.id(), action_type, cmd.details);
        let transcript = self
            .repository
            .list_turns(session.id(), &[TurnRole::System])
            .await?;
        let mut actions = self.repository.list_actions(session.id()).await?;
        actions.push(action.clone());

        let evaluation = self.evaluator.evaluate(&case, &transcript, &actions).await;

        session.close(&evaluation)?;
        self.repository.close_session(&session, &action).await?;

        tracing::info!(
            encounter_id = %session.id(),
            global_score = evaluation.global_score,
            degraded = evaluation.degraded,
            "encounter closed"
        );

        Ok(SubmitActionResult {
            action,
            closed: true,
            evaluation: Some(evaluation),
        })
    }
}
