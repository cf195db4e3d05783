//! SubmitMessageHandler - one learner message, one simulated-patient reply.
//!
//! The learner always gets a reply: when the model cannot answer, a fixed
//! placeholder is persisted in its place. The inbound turn is never left
//! without a following reply turn.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::conversation::{format_turns, patient_instruction};
use crate::domain::encounter::{Turn, TurnRole};
use crate::domain::foundation::{CaseId, DomainError, EncounterId, ErrorCode, UserId};
use crate::ports::{
    AIError, AIProvider, CaseCatalog, EncounterRepository, GenerationParams, GenerationRequest,
};

/// Reply persisted when the model fails for any reason but configuration.
pub const PLACEHOLDER_REPLY: &str =
    "(Le patient semble confus et ne répond pas. Vérifiez la connexion.)";

/// Reply persisted when no model API key is configured.
pub const UNCONFIGURED_REPLY: &str =
    "Erreur technique : Le simulateur n'est pas configuré (Clé API manquante).";

/// Command to send a learner message.
#[derive(Debug, Clone)]
pub struct SubmitMessageCommand {
    pub user_id: UserId,
    pub encounter_id: EncounterId,
    pub content: String,
}

impl SubmitMessageCommand {
    pub fn new(user_id: UserId, encounter_id: EncounterId, content: impl Into<String>) -> Self {
        Self {
            user_id,
            encounter_id,
            content: content.into(),
        }
    }
}

/// Both persisted turns of the exchange.
#[derive(Debug, Clone)]
pub struct SubmitMessageResult {
    pub doctor_turn: Turn,
    pub patient_turn: Turn,
    /// True when `patient_turn` is a placeholder.
    pub degraded: bool,
}

#[derive(Debug, Clone, Error)]
pub enum SubmitMessageError {
    #[error("Validation error: message content cannot be empty")]
    EmptyContent,

    /// Unknown encounter, or owned by someone else.
    #[error("Encounter not found: {0}")]
    NotFound(EncounterId),

    #[error("Encounter is closed and accepts no further messages")]
    EncounterClosed,

    #[error("Case not found: {0}")]
    CaseNotFound(CaseId),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for SubmitMessageError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::EncounterClosed => SubmitMessageError::EncounterClosed,
            _ => SubmitMessageError::Repository(err.to_string()),
        }
    }
}

/// Handler for the conversation turn.
pub struct SubmitMessageHandler {
    repository: Arc<dyn EncounterRepository>,
    catalog: Arc<dyn CaseCatalog>,
    ai_provider: Arc<dyn AIProvider>,
}

impl SubmitMessageHandler {
    pub fn new(
        repository: Arc<dyn EncounterRepository>,
        catalog: Arc<dyn CaseCatalog>,
        ai_provider: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            repository,
            catalog,
            ai_provider,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitMessageCommand,
    ) -> Result<SubmitMessageResult, SubmitMessageError> {
        // 1. Validate content
        if cmd.content.trim().is_empty() {
            return Err(SubmitMessageError::EmptyContent);
        }

        // 2. Load session (ownership-scoped), case and prior history
        let session = self
            .repository
            .load_session(&cmd.encounter_id, &cmd.user_id)
            .await?
            .ok_or(SubmitMessageError::NotFound(cmd.encounter_id))?;
        session.ensure_open()?;

        let case = self
            .catalog
            .get_case_content(session.case_id())
            .await?
            .ok_or(SubmitMessageError::CaseNotFound(*session.case_id()))?;

        let history = self
            .repository
            .list_turns(session.id(), &[TurnRole::System])
            .await?;

        // 3. Persist the inbound turn
        let doctor_turn = self
            .repository
            .append_turn(session.id(), TurnRole::Doctor, &cmd.content)
            .await?;

        // 4. Ask the patient
        let request = GenerationRequest::new(patient_instruction(&case))
            .with_blocks(format_turns(&history, &cmd.content))
            .with_params(GenerationParams::patient());

        let (reply, degraded) = match self.ai_provider.generate(request).await {
            Ok(response) => (response.text, false),
            Err(error) => {
                tracing::warn!(
                    encounter_id = %session.id(),
                    error = %error,
                    "patient reply unavailable, persisting placeholder"
                );
                (placeholder_for(&error).to_string(), true)
            }
        };

        // 5. Persist the reply
        let patient_turn = self
            .repository
            .append_turn(session.id(), TurnRole::Patient, &reply)
            .await?;

        Ok(SubmitMessageResult {
            doctor_turn,
            patient_turn,
            degraded,
        })
    }
}

fn placeholder_for(error: &AIError) -> &'static str {
    match error {
        AIError::NotConfigured(_) => UNCONFIGURED_REPLY,
        _ => PLACEHOLDER_REPLY,
    }
}
