//! Encounter module - the simulated consultation and its lifecycle.

mod action;
mod rime;
mod session;
mod turn;

pub use action::{ActionType, RecordedAction};
pub use rime::{
    validate_score, EncounterEvaluation, MasteryLevel, RimeAxis, RimeDetails, RimeScores,
    FALLBACK_FEEDBACK, FEEDBACK_KEY, MAX_SCORE, MIN_SCORE,
};
pub use session::EncounterSession;
pub use turn::{Turn, TurnRole};
