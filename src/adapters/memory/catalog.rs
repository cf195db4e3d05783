//! In-memory case catalog and learner profile reader.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::clinical::{ClinicalCase, LearnerProfile};
use crate::domain::foundation::{CaseId, DomainError, UserId};
use crate::ports::{CaseCatalog, LearnerProfileReader};

/// Fixed set of cases, seeded at construction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseCatalog {
    cases: HashMap<CaseId, ClinicalCase>,
}

impl InMemoryCaseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case(mut self, case: ClinicalCase) -> Self {
        self.cases.insert(case.id, case);
        self
    }
}

#[async_trait]
impl CaseCatalog for InMemoryCaseCatalog {
    async fn get_case(&self, id: &CaseId) -> Result<Option<ClinicalCase>, DomainError> {
        Ok(self.cases.get(id).cloned())
    }
}

/// Fixed set of learner profiles, seeded at construction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileReader {
    profiles: HashMap<UserId, LearnerProfile>,
}

impl InMemoryProfileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, user_id: UserId, profile: LearnerProfile) -> Self {
        self.profiles.insert(user_id, profile);
        self
    }
}

#[async_trait]
impl LearnerProfileReader for InMemoryProfileReader {
    async fn get_learner_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<LearnerProfile>, DomainError> {
        Ok(self.profiles.get(user_id).cloned())
    }
}
