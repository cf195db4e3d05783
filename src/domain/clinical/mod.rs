//! Clinical module - read-only documents supplied by the case catalog and
//! the learner profile service.

mod case;
mod profile;

pub use case::{CaseContent, ClinicalCase};
pub use profile::{LearnerProfile, Language, Specialty, DEFAULT_STUDY_LEVEL};
