//! StartEncounterHandler - opens a new encounter on a case.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::encounter::{EncounterSession, Turn, TurnRole};
use crate::domain::foundation::{CaseId, DomainError, UserId};
use crate::ports::{CaseCatalog, EncounterRepository};

/// System turn written when an encounter opens.
pub const ENTRY_NOTICE: &str = "Le patient est entré dans la salle.";

/// Command to open an encounter.
#[derive(Debug, Clone)]
pub struct StartEncounterCommand {
    pub user_id: UserId,
    pub case_id: CaseId,
}

impl StartEncounterCommand {
    pub fn new(user_id: UserId, case_id: CaseId) -> Self {
        Self { user_id, case_id }
    }
}

#[derive(Debug, Clone)]
pub struct StartEncounterResult {
    pub session: EncounterSession,
    pub opening_turn: Turn,
}

#[derive(Debug, Clone, Error)]
pub enum StartEncounterError {
    #[error("Case not found: {0}")]
    CaseNotFound(CaseId),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for StartEncounterError {
    fn from(err: DomainError) -> Self {
        StartEncounterError::Repository(err.to_string())
    }
}

/// Handler for opening encounters.
pub struct StartEncounterHandler {
    repository: Arc<dyn EncounterRepository>,
    catalog: Arc<dyn CaseCatalog>,
}

impl StartEncounterHandler {
    pub fn new(repository: Arc<dyn EncounterRepository>, catalog: Arc<dyn CaseCatalog>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartEncounterCommand,
    ) -> Result<StartEncounterResult, StartEncounterError> {
        // 1. The case must exist
        if self.catalog.get_case(&cmd.case_id).await?.is_none() {
            return Err(StartEncounterError::CaseNotFound(cmd.case_id));
        }

        // 2. Open and persist
        let session = EncounterSession::start(cmd.user_id, cmd.case_id);
        self.repository.create_session(&session).await?;

        // 3. Entry notice, shown in the transcript but never sent to the model
        let opening_turn = self
            .repository
            .append_turn(session.id(), TurnRole::System, ENTRY_NOTICE)
            .await?;

        tracing::info!(
            encounter_id = %session.id(),
            case_id = %session.case_id(),
            user_id = %session.owner(),
            "encounter started"
        );

        Ok(StartEncounterResult {
            session,
            opening_turn,
        })
    }
}
