//! Foundation module - Shared domain primitives.
//!
//! Value objects, identifiers, lifecycle status and error types
//! shared by every other domain module.

mod encounter_status;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use encounter_status::EncounterStatus;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ActionId, CaseId, EncounterId, TurnId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
