//! Encounter session aggregate.
//!
//! An encounter is one learner's attempt at a simulated case. It starts
//! `Open`, accepts turns and actions, and closes exactly once when the
//! closing action is submitted, at which point the tutor's evaluation is
//! written onto it.

use serde::{Deserialize, Serialize};

use super::rime::{EncounterEvaluation, RimeDetails};
use crate::domain::foundation::{
    CaseId, DomainError, EncounterId, EncounterStatus, ErrorCode, StateMachine, Timestamp, UserId,
};

/// Encounter aggregate.
///
/// # Invariants
///
/// - `global_score` is 0 and `rime_details` is `None` while `Open`
/// - both are written exactly once, on the transition to `Closed`
/// - `ended_at` is set iff the status is `Closed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSession {
    id: EncounterId,
    owner: UserId,
    case_id: CaseId,
    status: EncounterStatus,
    global_score: f64,
    rime_details: Option<RimeDetails>,
    started_at: Timestamp,
    ended_at: Option<Timestamp>,
}

impl EncounterSession {
    /// Opens a new encounter for `owner` on `case_id`.
    pub fn start(owner: UserId, case_id: CaseId) -> Self {
        Self {
            id: EncounterId::new(),
            owner,
            case_id,
            status: EncounterStatus::Open,
            global_score: 0.0,
            rime_details: None,
            started_at: Timestamp::now(),
            ended_at: None,
        }
    }

    /// Reconstitute from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: EncounterId,
        owner: UserId,
        case_id: CaseId,
        status: EncounterStatus,
        global_score: f64,
        rime_details: Option<RimeDetails>,
        started_at: Timestamp,
        ended_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            owner,
            case_id,
            status,
            global_score,
            rime_details,
            started_at,
            ended_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &EncounterId {
        &self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    pub fn status(&self) -> EncounterStatus {
        self.status
    }

    pub fn global_score(&self) -> f64 {
        self.global_score
    }

    pub fn rime_details(&self) -> Option<&RimeDetails> {
        self.rime_details.as_ref()
    }

    /// Tutor feedback, available once closed.
    pub fn feedback(&self) -> Option<&str> {
        self.rime_details.as_ref().map(|d| d.feedback.as_str())
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.owner == user_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Fails with `EncounterClosed` once the encounter has ended.
    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.status.is_open() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::EncounterClosed,
                "Encounter is closed and accepts no further input",
            )
            .with_detail("encounter_id", self.id.to_string()))
        }
    }

    /// Closes the encounter with the tutor's evaluation.
    ///
    /// Stamps the end time and writes the aggregate score and per-axis
    /// mapping (feedback included) in one step.
    ///
    /// # Errors
    ///
    /// - `EncounterClosed` if already closed
    pub fn close(&mut self, evaluation: &EncounterEvaluation) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.status = self
            .status
            .transition_to(EncounterStatus::Closed)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        self.global_score = evaluation.global_score;
        self.rime_details = Some(evaluation.to_details());
        self.ended_at = Some(Timestamp::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::encounter::rime::{RimeAxis, RimeScores};

    fn learner() -> UserId {
        UserId::new("learner-1").unwrap()
    }

    fn evaluation(score: f64) -> EncounterEvaluation {
        EncounterEvaluation {
            global_score: score,
            rime_details: RimeScores {
                reporter: score,
                interpreter: score,
                manager: score,
                educator: score,
            },
            feedback_text: "Bien".to_string(),
            degraded: false,
        }
    }

    #[test]
    fn starts_open_with_unset_scores() {
        let session = EncounterSession::start(learner(), CaseId::new());
        assert_eq!(session.status(), EncounterStatus::Open);
        assert_eq!(session.global_score(), 0.0);
        assert!(session.rime_details().is_none());
        assert!(session.ended_at().is_none());
    }

    #[test]
    fn close_writes_scores_and_stamps_end() {
        let mut session = EncounterSession::start(learner(), CaseId::new());
        session.close(&evaluation(74.0)).unwrap();

        assert_eq!(session.status(), EncounterStatus::Closed);
        assert_eq!(session.global_score(), 74.0);
        let details = session.rime_details().unwrap();
        for axis in RimeAxis::ALL {
            assert_eq!(details.scores.get(axis), 74.0);
        }
        assert_eq!(session.feedback(), Some("Bien"));
        assert!(session.ended_at().is_some());
    }

    #[test]
    fn close_happens_exactly_once() {
        let mut session = EncounterSession::start(learner(), CaseId::new());
        session.close(&evaluation(60.0)).unwrap();

        let err = session.close(&evaluation(99.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::EncounterClosed);
        assert_eq!(session.global_score(), 60.0);
    }

    #[test]
    fn ownership_is_checked_by_user_id() {
        let session = EncounterSession::start(learner(), CaseId::new());
        assert!(session.is_owner(&learner()));
        assert!(!session.is_owner(&UserId::new("someone-else").unwrap()));
    }
}
