//! In-memory implementation of EncounterRepository.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::encounter::{ActionType, EncounterSession, RecordedAction, Turn, TurnRole};
use crate::domain::foundation::{DomainError, EncounterId, ErrorCode, UserId};
use crate::ports::EncounterRepository;

#[derive(Default)]
struct Store {
    /// Insertion order doubles as start order.
    sessions: Vec<EncounterSession>,
    turns: HashMap<EncounterId, Vec<Turn>>,
    actions: HashMap<EncounterId, Vec<RecordedAction>>,
}

impl Store {
    fn session_mut(&mut self, id: &EncounterId) -> Option<&mut EncounterSession> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }

    fn ensure_exists(&self, id: &EncounterId) -> Result<(), DomainError> {
        if self.sessions.iter().any(|s| s.id() == id) {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    fn ensure_open(&self, id: &EncounterId) -> Result<(), DomainError> {
        self.sessions
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| not_found(id))?
            .ensure_open()
    }
}

/// Encounter store held behind a single mutex.
#[derive(Default)]
pub struct InMemoryEncounterRepository {
    store: Mutex<Store>,
}

impl InMemoryEncounterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored sessions, across all owners.
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }
}

fn not_found(id: &EncounterId) -> DomainError {
    DomainError::new(ErrorCode::EncounterNotFound, "Encounter not found")
        .with_detail("encounter_id", id.to_string())
}

#[async_trait]
impl EncounterRepository for InMemoryEncounterRepository {
    async fn create_session(&self, session: &EncounterSession) -> Result<(), DomainError> {
        let mut store = self.lock();
        if store.sessions.iter().any(|s| s.id() == session.id()) {
            return Err(DomainError::database("Encounter already exists")
                .with_detail("encounter_id", session.id().to_string()));
        }
        store.sessions.push(session.clone());
        Ok(())
    }

    async fn load_session(
        &self,
        id: &EncounterId,
        owner: &UserId,
    ) -> Result<Option<EncounterSession>, DomainError> {
        Ok(self
            .lock()
            .sessions
            .iter()
            .find(|s| s.id() == id && s.is_owner(owner))
            .cloned())
    }

    async fn append_turn(
        &self,
        id: &EncounterId,
        role: TurnRole,
        content: &str,
    ) -> Result<Turn, DomainError> {
        let mut store = self.lock();
        store.ensure_exists(id)?;
        let turn = Turn::new(*id, role, content);
        store.turns.entry(*id).or_default().push(turn.clone());
        Ok(turn)
    }

    async fn append_action(
        &self,
        id: &EncounterId,
        action_type: &ActionType,
        details: &Map<String, Value>,
    ) -> Result<RecordedAction, DomainError> {
        let mut store = self.lock();
        store.ensure_open(id)?;
        let action = RecordedAction::new(*id, action_type.clone(), details.clone());
        store.actions.entry(*id).or_default().push(action.clone());
        Ok(action)
    }

    async fn list_turns(
        &self,
        id: &EncounterId,
        exclude_roles: &[TurnRole],
    ) -> Result<Vec<Turn>, DomainError> {
        Ok(self
            .lock()
            .turns
            .get(id)
            .map(|turns| {
                turns
                    .iter()
                    .filter(|t| !exclude_roles.contains(&t.role()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_actions(&self, id: &EncounterId) -> Result<Vec<RecordedAction>, DomainError> {
        Ok(self.lock().actions.get(id).cloned().unwrap_or_default())
    }

    async fn close_session(
        &self,
        session: &EncounterSession,
        closing_action: &RecordedAction,
    ) -> Result<(), DomainError> {
        let mut store = self.lock();
        store.ensure_open(session.id())?;
        if let Some(stored) = store.session_mut(session.id()) {
            *stored = session.clone();
        }
        store
            .actions
            .entry(*session.id())
            .or_default()
            .push(closing_action.clone());
        Ok(())
    }

    async fn list_sessions(&self, owner: &UserId) -> Result<Vec<EncounterSession>, DomainError> {
        Ok(self
            .lock()
            .sessions
            .iter()
            .rev()
            .filter(|s| s.is_owner(owner))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::encounter::EncounterEvaluation;
    use crate::domain::foundation::{CaseId, EncounterStatus};

    fn learner(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    async fn seeded(repo: &InMemoryEncounterRepository, owner: &str) -> EncounterSession {
        let session = EncounterSession::start(learner(owner), CaseId::new());
        repo.create_session(&session).await.unwrap();
        session
    }

    fn closing_for(session: &EncounterSession) -> RecordedAction {
        RecordedAction::new(*session.id(), ActionType::closing(), Map::new())
    }

    mod sessions {
        use super::*;

        #[tokio::test]
        async fn load_is_owner_scoped() {
            let repo = InMemoryEncounterRepository::new();
            let session = seeded(&repo, "alice").await;

            assert!(repo
                .load_session(session.id(), &learner("alice"))
                .await
                .unwrap()
                .is_some());
            assert!(repo
                .load_session(session.id(), &learner("bob"))
                .await
                .unwrap()
                .is_none());
        }

        #[tokio::test]
        async fn list_is_newest_first_and_owner_scoped() {
            let repo = InMemoryEncounterRepository::new();
            let first = seeded(&repo, "alice").await;
            seeded(&repo, "bob").await;
            let second = seeded(&repo, "alice").await;

            let listed = repo.list_sessions(&learner("alice")).await.unwrap();
            let ids: Vec<_> = listed.iter().map(|s| *s.id()).collect();
            assert_eq!(ids, vec![*second.id(), *first.id()]);
        }

        #[tokio::test]
        async fn close_persists_once() {
            let repo = InMemoryEncounterRepository::new();
            let mut session = seeded(&repo, "alice").await;
            session.close(&EncounterEvaluation::fallback()).unwrap();

            repo.close_session(&session, &closing_for(&session)).await.unwrap();
            let stored = repo
                .load_session(session.id(), &learner("alice"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.status(), EncounterStatus::Closed);

            let err = repo
                .close_session(&session, &closing_for(&session))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::EncounterClosed);
        }

        #[tokio::test]
        async fn close_records_the_closing_action_once() {
            // Given: two closings racing on the same open session
            let repo = InMemoryEncounterRepository::new();
            let mut session = seeded(&repo, "alice").await;
            session.close(&EncounterEvaluation::fallback()).unwrap();

            // When: both try to commit
            repo.close_session(&session, &closing_for(&session)).await.unwrap();
            let loser = repo.close_session(&session, &closing_for(&session)).await;

            // Then: the loser is rejected and leaves nothing in the log
            assert_eq!(loser.unwrap_err().code, ErrorCode::EncounterClosed);
            let actions = repo.list_actions(session.id()).await.unwrap();
            assert_eq!(actions.len(), 1);
            assert!(actions[0].action_type().is_closing());
        }

        #[tokio::test]
        async fn close_unknown_is_not_found() {
            let repo = InMemoryEncounterRepository::new();
            let session = EncounterSession::start(learner("alice"), CaseId::new());
            let err = repo
                .close_session(&session, &closing_for(&session))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::EncounterNotFound);
            assert!(repo.list_actions(session.id()).await.unwrap().is_empty());
        }
    }

    mod turns_and_actions {
        use super::*;

        #[tokio::test]
        async fn turns_keep_order_and_filter_roles() {
            let repo = InMemoryEncounterRepository::new();
            let session = seeded(&repo, "alice").await;
            let id = session.id();

            repo.append_turn(id, TurnRole::System, "entrée").await.unwrap();
            repo.append_turn(id, TurnRole::Doctor, "Bonjour").await.unwrap();
            repo.append_turn(id, TurnRole::Patient, "J'ai mal").await.unwrap();

            let all = repo.list_turns(id, &[]).await.unwrap();
            assert_eq!(all.len(), 3);

            let visible = repo.list_turns(id, &[TurnRole::System]).await.unwrap();
            let contents: Vec<_> = visible.iter().map(|t| t.content()).collect();
            assert_eq!(contents, vec!["Bonjour", "J'ai mal"]);
        }

        #[tokio::test]
        async fn append_to_unknown_session_fails() {
            let repo = InMemoryEncounterRepository::new();
            let err = repo
                .append_turn(&EncounterId::new(), TurnRole::Doctor, "?")
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::EncounterNotFound);
        }

        #[tokio::test]
        async fn actions_keep_details() {
            let repo = InMemoryEncounterRepository::new();
            let session = seeded(&repo, "alice").await;
            let mut details = Map::new();
            details.insert("examen".to_string(), Value::from("ECG"));

            repo.append_action(session.id(), &ActionType::new("EXAMEN").unwrap(), &details)
                .await
                .unwrap();

            let actions = repo.list_actions(session.id()).await.unwrap();
            assert_eq!(actions.len(), 1);
            assert_eq!(actions[0].action_type().as_str(), "EXAMEN");
            assert_eq!(actions[0].details()["examen"], "ECG");
        }

        #[tokio::test]
        async fn append_after_close_is_rejected() {
            let repo = InMemoryEncounterRepository::new();
            let mut session = seeded(&repo, "alice").await;
            session.close(&EncounterEvaluation::fallback()).unwrap();
            repo.close_session(&session, &closing_for(&session)).await.unwrap();

            let err = repo
                .append_action(session.id(), &ActionType::new("EXAMEN").unwrap(), &Map::new())
                .await
                .unwrap_err();

            assert_eq!(err.code, ErrorCode::EncounterClosed);
            assert_eq!(repo.list_actions(session.id()).await.unwrap().len(), 1);
        }
    }
}
