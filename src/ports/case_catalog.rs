//! Read-only providers for case content and learner profiles.

use async_trait::async_trait;

use crate::domain::clinical::{CaseContent, ClinicalCase, LearnerProfile};
use crate::domain::foundation::{CaseId, DomainError, UserId};

/// Catalog of clinical cases.
#[async_trait]
pub trait CaseCatalog: Send + Sync {
    /// Case metadata and content, or `None` if unknown.
    async fn get_case(&self, id: &CaseId) -> Result<Option<ClinicalCase>, DomainError>;

    /// Just the ground-truth document.
    async fn get_case_content(&self, id: &CaseId) -> Result<Option<CaseContent>, DomainError> {
        Ok(self.get_case(id).await?.map(|case| case.content))
    }
}

/// Source of learner profiles.
#[async_trait]
pub trait LearnerProfileReader: Send + Sync {
    /// The learner's profile, or `None` if they never filled one in.
    async fn get_learner_profile(&self, user_id: &UserId)
        -> Result<Option<LearnerProfile>, DomainError>;
}
