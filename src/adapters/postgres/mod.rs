//! PostgreSQL adapters.
//!
//! - `PostgresEncounterRepository` - sessions, turns and actions
//! - `PostgresCaseCatalog` - read-only clinical case catalog
//! - `PostgresProfileReader` - read-only learner profiles
//!
//! Schema lives in `migrations/` and is applied with [`run_migrations`].

mod case_catalog;
mod encounter_repository;

pub use case_catalog::{PostgresCaseCatalog, PostgresProfileReader};
pub use encounter_repository::PostgresEncounterRepository;

use sqlx::PgPool;

use crate::domain::foundation::DomainError;

/// Applies pending migrations bundled at compile time.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::database(format!("Migration failed: {}", e)))
}

#[cfg(test)]
mod tests {
    const SCHEMA: &str = include_str!("../../../migrations/0001_encounters.sql");

    fn column_definition(table: &str, column: &str) -> String {
        let body = SCHEMA
            .split(&format!("CREATE TABLE IF NOT EXISTS {} (", table))
            .nth(1)
            .and_then(|rest| rest.split(");").next())
            .unwrap_or_default();
        body.lines()
            .map(str::trim)
            .find(|line| line.starts_with(column))
            .unwrap_or_default()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn deleting_a_case_cascades_to_its_sessions() {
        assert_eq!(
            column_definition("encounter_sessions", "case_id"),
            "case_id UUID NOT NULL REFERENCES clinical_cases (id) ON DELETE CASCADE,"
        );
    }

    #[test]
    fn deleting_a_session_cascades_to_its_log() {
        for table in ["conversation_turns", "recorded_actions"] {
            assert!(column_definition(table, "encounter_id")
                .contains("REFERENCES encounter_sessions (id) ON DELETE CASCADE"));
        }
    }
}
