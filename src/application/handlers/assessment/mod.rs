//! Tutor-side handlers: placement quiz generation and end-of-encounter
//! RIME evaluation.
//!
//! Both follow the same degrade policy: a [`TutorFailure`] is logged and
//! replaced by a deterministic fallback, never surfaced to the caller.

mod evaluate_encounter;
mod generate_assessment;

pub use evaluate_encounter::EncounterEvaluator;
pub use generate_assessment::{GenerateAssessmentCommand, GenerateAssessmentHandler};

use thiserror::Error;

use crate::domain::assessment::SchemaError;
use crate::domain::conversation::ExtractionError;
use crate::ports::AIError;

/// Why a structured tutor reply was discarded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TutorFailure {
    #[error("model call failed: {0}")]
    Model(#[from] AIError),

    #[error("no JSON in model output: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("output violates schema: {0}")]
    Schema(#[from] SchemaError),
}
