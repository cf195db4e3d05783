//! ListEncounterHistoryHandler - the learner's past encounters, newest first.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::clinical::ClinicalCase;
use crate::domain::encounter::MasteryLevel;
use crate::domain::foundation::{CaseId, DomainError, EncounterId, EncounterStatus, UserId};
use crate::ports::{CaseCatalog, EncounterRepository};

/// Title shown when a session's case is no longer in the catalog.
pub const UNKNOWN_CASE_TITLE: &str = "Cas inconnu";

#[derive(Debug, Clone)]
pub struct ListHistoryQuery {
    pub user_id: UserId,
}

/// One row of the history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryItem {
    pub encounter_id: EncounterId,
    pub case_title: String,
    pub case_specialty: String,
    /// `YYYY-MM-DD HH:MM`, UTC.
    pub started_at: String,
    /// Aggregate score, truncated.
    pub score: i64,
    pub mastery: MasteryLevel,
    pub status: EncounterStatus,
}

pub struct ListEncounterHistoryHandler {
    repository: Arc<dyn EncounterRepository>,
    catalog: Arc<dyn CaseCatalog>,
}

impl ListEncounterHistoryHandler {
    pub fn new(repository: Arc<dyn EncounterRepository>, catalog: Arc<dyn CaseCatalog>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    pub async fn handle(&self, query: ListHistoryQuery) -> Result<Vec<HistoryItem>, DomainError> {
        let sessions = self.repository.list_sessions(&query.user_id).await?;

        let mut cases: HashMap<CaseId, Option<ClinicalCase>> = HashMap::new();
        let mut items = Vec::with_capacity(sessions.len());

        for session in sessions {
            if !cases.contains_key(session.case_id()) {
                let case = self.catalog.get_case(session.case_id()).await?;
                cases.insert(*session.case_id(), case);
            }
            let case = cases.get(session.case_id()).and_then(Option::as_ref);

            items.push(HistoryItem {
                encounter_id: *session.id(),
                case_title: case
                    .map(|c| c.title.clone())
                    .unwrap_or_else(|| UNKNOWN_CASE_TITLE.to_string()),
                case_specialty: case.map(|c| c.specialty.clone()).unwrap_or_default(),
                started_at: session.started_at().to_display_minutes(),
                score: session.global_score().trunc() as i64,
                mastery: MasteryLevel::from_score(session.global_score()),
                status: session.status(),
            });
        }

        Ok(items)
    }
}
