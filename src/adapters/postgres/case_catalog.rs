//! PostgreSQL case catalog and learner profile reader.
//!
//! Both tables are owned by the authoring side; this service only reads them.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

use crate::domain::clinical::{CaseContent, ClinicalCase, Language, LearnerProfile};
use crate::domain::foundation::{CaseId, DomainError, UserId};
use crate::ports::{CaseCatalog, LearnerProfileReader};

/// Reads cases from `clinical_cases`.
#[derive(Clone)]
pub struct PostgresCaseCatalog {
    pool: PgPool,
}

impl PostgresCaseCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseCatalog for PostgresCaseCatalog {
    async fn get_case(&self, id: &CaseId) -> Result<Option<ClinicalCase>, DomainError> {
        let row = sqlx::query("SELECT id, title, specialty, content FROM clinical_cases WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch case: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let content: Value = row
            .try_get("content")
            .map_err(|e| DomainError::database(format!("Failed to get content: {}", e)))?;
        let title: String = row
            .try_get("title")
            .map_err(|e| DomainError::database(format!("Failed to get title: {}", e)))?;
        let specialty: String = row
            .try_get("specialty")
            .map_err(|e| DomainError::database(format!("Failed to get specialty: {}", e)))?;

        Ok(Some(ClinicalCase {
            id: *id,
            title,
            specialty,
            content: CaseContent::from_value(content),
        }))
    }
}

/// Reads profiles from `learner_profiles`.
#[derive(Clone)]
pub struct PostgresProfileReader {
    pool: PgPool,
}

impl PostgresProfileReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LearnerProfileReader for PostgresProfileReader {
    async fn get_learner_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<LearnerProfile>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT language, study_level, specialty, objectives
            FROM learner_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch learner profile: {}", e)))?;

        row.map(|row| {
            let get_err = |e: sqlx::Error| {
                DomainError::database(format!("Failed to read learner profile: {}", e))
            };
            let language: Option<String> = row.try_get("language").map_err(get_err)?;
            let objectives: Option<Vec<String>> = row.try_get("objectives").map_err(get_err)?;

            Ok(LearnerProfile {
                language: language
                    .as_deref()
                    .map(Language::from_code)
                    .unwrap_or_default(),
                study_level: row.try_get("study_level").map_err(get_err)?,
                specialty: row.try_get("specialty").map_err(get_err)?,
                objectives: objectives.unwrap_or_default(),
            })
        })
        .transpose()
    }
}
