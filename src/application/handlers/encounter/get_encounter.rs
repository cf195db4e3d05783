//! GetEncounterHandler - full encounter view for the simulation screen.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::clinical::ClinicalCase;
use crate::domain::encounter::{EncounterSession, RecordedAction, Turn};
use crate::domain::foundation::{DomainError, EncounterId, UserId};
use crate::ports::{CaseCatalog, EncounterRepository};

#[derive(Debug, Clone)]
pub struct GetEncounterQuery {
    pub user_id: UserId,
    pub encounter_id: EncounterId,
}

impl GetEncounterQuery {
    pub fn new(user_id: UserId, encounter_id: EncounterId) -> Self {
        Self {
            user_id,
            encounter_id,
        }
    }
}

/// Session with its complete transcript (system turns included) and log.
#[derive(Debug, Clone)]
pub struct EncounterView {
    pub session: EncounterSession,
    pub turns: Vec<Turn>,
    pub actions: Vec<RecordedAction>,
    /// `None` if the case has since left the catalog.
    pub case: Option<ClinicalCase>,
}

#[derive(Debug, Clone, Error)]
pub enum GetEncounterError {
    #[error("Encounter not found: {0}")]
    NotFound(EncounterId),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for GetEncounterError {
    fn from(err: DomainError) -> Self {
        GetEncounterError::Repository(err.to_string())
    }
}

pub struct GetEncounterHandler {
    repository: Arc<dyn EncounterRepository>,
    catalog: Arc<dyn CaseCatalog>,
}

impl GetEncounterHandler {
    pub fn new(repository: Arc<dyn EncounterRepository>, catalog: Arc<dyn CaseCatalog>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    pub async fn handle(&self, query: GetEncounterQuery) -> Result<EncounterView, GetEncounterError> {
        let session = self
            .repository
            .load_session(&query.encounter_id, &query.user_id)
            .await?
            .ok_or(GetEncounterError::NotFound(query.encounter_id))?;

        let turns = self.repository.list_turns(session.id(), &[]).await?;
        let actions = self.repository.list_actions(session.id()).await?;
        let case = self.catalog.get_case(session.case_id()).await?;

        Ok(EncounterView {
            session,
            turns,
            actions,
            case,
        })
    }
}
