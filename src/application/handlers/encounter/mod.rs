//! Encounter command and query handlers.
//!
//! Commands drive the encounter lifecycle (start, converse, act, close);
//! queries serve the transcript view and the learner's history table.

mod get_encounter;
mod list_history;
mod start_encounter;
mod submit_action;
mod submit_message;

pub use get_encounter::{EncounterView, GetEncounterError, GetEncounterHandler, GetEncounterQuery};
pub use list_history::{
    HistoryItem, ListEncounterHistoryHandler, ListHistoryQuery, UNKNOWN_CASE_TITLE,
};
pub use start_encounter::{
    StartEncounterCommand, StartEncounterError, StartEncounterHandler, StartEncounterResult,
    ENTRY_NOTICE,
};
pub use submit_action::{
    SubmitActionCommand, SubmitActionError, SubmitActionHandler, SubmitActionResult,
};
pub use submit_message::{
    SubmitMessageCommand, SubmitMessageError, SubmitMessageHandler, SubmitMessageResult,
    PLACEHOLDER_REPLY, UNCONFIGURED_REPLY,
};
