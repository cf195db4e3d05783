//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations over the
//! ports.

pub mod assessment;
pub mod encounter;

pub use assessment::{
    EncounterEvaluator, GenerateAssessmentCommand, GenerateAssessmentHandler, TutorFailure,
};
pub use encounter::{
    EncounterView, GetEncounterError, GetEncounterHandler, GetEncounterQuery, HistoryItem,
    ListEncounterHistoryHandler, ListHistoryQuery, StartEncounterCommand, StartEncounterError,
    StartEncounterHandler, StartEncounterResult, SubmitActionCommand, SubmitActionError,
    SubmitActionHandler, SubmitActionResult, SubmitMessageCommand, SubmitMessageError,
    SubmitMessageHandler, SubmitMessageResult,
};
