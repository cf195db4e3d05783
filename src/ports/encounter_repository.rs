//! Encounter repository port.
//!
//! Persistence for encounter sessions, their conversation turns and their
//! recorded actions. Reads are ownership-scoped: a session that exists but
//! belongs to someone else is reported as absent.
//!
//! Turns and actions are returned in creation order, which is the canonical
//! conversation order.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::encounter::{ActionType, EncounterSession, RecordedAction, Turn, TurnRole};
use crate::domain::foundation::{DomainError, EncounterId, UserId};

#[async_trait]
pub trait EncounterRepository: Send + Sync {
    /// Persists a newly started session.
    async fn create_session(&self, session: &EncounterSession) -> Result<(), DomainError>;

    /// Loads a session if it exists and is owned by `owner`.
    async fn load_session(
        &self,
        id: &EncounterId,
        owner: &UserId,
    ) -> Result<Option<EncounterSession>, DomainError>;

    /// Appends a turn stamped with the current time.
    async fn append_turn(
        &self,
        id: &EncounterId,
        role: TurnRole,
        content: &str,
    ) -> Result<Turn, DomainError>;

    /// Appends an action stamped with the current time.
    ///
    /// # Errors
    ///
    /// - `EncounterClosed` if the stored session is no longer open
    /// - `EncounterNotFound` if it does not exist
    async fn append_action(
        &self,
        id: &EncounterId,
        action_type: &ActionType,
        details: &Map<String, Value>,
    ) -> Result<RecordedAction, DomainError>;

    /// Turns in creation order, omitting any role in `exclude_roles`.
    async fn list_turns(
        &self,
        id: &EncounterId,
        exclude_roles: &[TurnRole],
    ) -> Result<Vec<Turn>, DomainError>;

    /// Actions in creation order.
    async fn list_actions(&self, id: &EncounterId) -> Result<Vec<RecordedAction>, DomainError>;

    /// Records `closing_action` and writes the closed state of `session`
    /// (status, end time, aggregate score and per-axis mapping with
    /// feedback) as one unit. On error neither is written.
    ///
    /// # Errors
    ///
    /// - `EncounterClosed` if the stored session is no longer open
    /// - `EncounterNotFound` if it does not exist
    async fn close_session(
        &self,
        session: &EncounterSession,
        closing_action: &RecordedAction,
    ) -> Result<(), DomainError>;

    /// All sessions owned by `owner`, newest first.
    async fn list_sessions(&self, owner: &UserId) -> Result<Vec<EncounterSession>, DomainError>;
}
