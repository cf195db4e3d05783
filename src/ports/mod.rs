//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Generative text model
//! - `EncounterRepository` - Sessions, turns and actions
//! - `CaseCatalog` - Clinical case content
//! - `LearnerProfileReader` - Learner profiles

mod ai_provider;
mod case_catalog;
mod encounter_repository;

pub use ai_provider::{
    AIError, AIProvider, FinishReason, GenerationParams, GenerationRequest, GenerationResponse,
    ProviderInfo, ResponseFormat, SafetyThreshold,
};
pub use case_catalog::{CaseCatalog, LearnerProfileReader};
pub use encounter_repository::EncounterRepository;
