//! In-memory adapters.
//!
//! Process-local implementations of the persistence and catalog ports, used
//! by tests and for running the service without a database.

mod catalog;
mod encounter_repository;

pub use catalog::{InMemoryCaseCatalog, InMemoryProfileReader};
pub use encounter_repository::InMemoryEncounterRepository;
