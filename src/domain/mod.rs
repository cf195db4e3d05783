//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `encounter` - Encounter session aggregate, turns, actions and RIME scoring
//! - `clinical` - Case content and learner profile documents
//! - `conversation` - Turn formatting, prompt construction and JSON extraction
//! - `assessment` - Quiz and evaluation schemas with their fallbacks

pub mod assessment;
pub mod clinical;
pub mod conversation;
pub mod encounter;
pub mod foundation;
