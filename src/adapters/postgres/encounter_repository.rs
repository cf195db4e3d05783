//! PostgreSQL implementation of EncounterRepository.
//!
//! Sessions live in `encounter_sessions`; turns and actions in append-only
//! tables ordered by `(created_at, seq)` so rows stamped within the same
//! clock tick keep their insertion order.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row};

use crate::domain::encounter::{
    ActionType, EncounterSession, RecordedAction, RimeDetails, Turn, TurnRole,
};
use crate::domain::foundation::{
    ActionId, CaseId, DomainError, EncounterId, EncounterStatus, ErrorCode, Timestamp, TurnId,
    UserId,
};
use crate::ports::EncounterRepository;

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL implementation of EncounterRepository.
#[derive(Clone)]
pub struct PostgresEncounterRepository {
    pool: PgPool,
}

impl PostgresEncounterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &EncounterId) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT 1 FROM encounter_sessions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("check encounter", e))?;
        Ok(row.is_some())
    }

    /// Classifies a guarded write that touched no row.
    async fn closed_or_missing(&self, id: &EncounterId) -> DomainError {
        match self.exists(id).await {
            Ok(true) => DomainError::new(ErrorCode::EncounterClosed, "Encounter already closed")
                .with_detail("encounter_id", id.to_string()),
            Ok(false) => not_found(id),
            Err(e) => e,
        }
    }
}

const INSERT_ACTION_IF_OPEN: &str = r#"
    INSERT INTO recorded_actions (id, encounter_id, action_type, details, created_at)
    SELECT $1, $2, $3, $4, $5
    WHERE EXISTS (
        SELECT 1 FROM encounter_sessions WHERE id = $2 AND status = 'open'
    )
"#;

#[async_trait]
impl EncounterRepository for PostgresEncounterRepository {
    async fn create_session(&self, session: &EncounterSession) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO encounter_sessions (
                id, user_id, case_id, status, global_score, rime_details, started_at, ended_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.owner().as_str())
        .bind(session.case_id().as_uuid())
        .bind(session.status().as_str())
        .bind(session.global_score())
        .bind(session.rime_details().map(Json))
        .bind(session.started_at().as_datetime())
        .bind(session.ended_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert encounter", e))?;

        Ok(())
    }

    async fn load_session(
        &self,
        id: &EncounterId,
        owner: &UserId,
    ) -> Result<Option<EncounterSession>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, case_id, status, global_score, rime_details, started_at, ended_at
            FROM encounter_sessions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch encounter", e))?;

        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn append_turn(
        &self,
        id: &EncounterId,
        role: TurnRole,
        content: &str,
    ) -> Result<Turn, DomainError> {
        let turn = Turn::new(*id, role, content);

        sqlx::query(
            r#"
            INSERT INTO conversation_turns (id, encounter_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(turn.id().as_uuid())
        .bind(id.as_uuid())
        .bind(role.as_str())
        .bind(turn.content())
        .bind(turn.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(id, "insert turn", e))?;

        Ok(turn)
    }

    async fn append_action(
        &self,
        id: &EncounterId,
        action_type: &ActionType,
        details: &Map<String, Value>,
    ) -> Result<RecordedAction, DomainError> {
        let action = RecordedAction::new(*id, action_type.clone(), details.clone());

        let result = sqlx::query(INSERT_ACTION_IF_OPEN)
            .bind(action.id().as_uuid())
            .bind(id.as_uuid())
            .bind(action_type.as_str())
            .bind(Json(action.details()))
            .bind(action.created_at().as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(id, "insert action", e))?;

        if result.rows_affected() == 0 {
            return Err(self.closed_or_missing(id).await);
        }

        Ok(action)
    }

    async fn list_turns(
        &self,
        id: &EncounterId,
        exclude_roles: &[TurnRole],
    ) -> Result<Vec<Turn>, DomainError> {
        let excluded: Vec<String> = exclude_roles.iter().map(|r| r.as_str().to_string()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, encounter_id, role, content, created_at
            FROM conversation_turns
            WHERE encounter_id = $1 AND NOT (role = ANY($2))
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(id.as_uuid())
        .bind(&excluded)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch turns", e))?;

        rows.iter().map(row_to_turn).collect()
    }

    async fn list_actions(&self, id: &EncounterId) -> Result<Vec<RecordedAction>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, encounter_id, action_type, details, created_at
            FROM recorded_actions
            WHERE encounter_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch actions", e))?;

        rows.iter().map(row_to_action).collect()
    }

    async fn close_session(
        &self,
        session: &EncounterSession,
        closing_action: &RecordedAction,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin close", e))?;

        // Guarded on the stored status so two concurrent closings cannot both win.
        let result = sqlx::query(
            r#"
            UPDATE encounter_sessions SET
                status = $2,
                global_score = $3,
                rime_details = $4,
                ended_at = $5
            WHERE id = $1 AND status = 'open'
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.status().as_str())
        .bind(session.global_score())
        .bind(session.rime_details().map(Json))
        .bind(session.ended_at().map(|t| *t.as_datetime()))
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("close encounter", e))?;

        if result.rows_affected() != 1 {
            tx.rollback()
                .await
                .map_err(|e| db_error("rollback close", e))?;
            return Err(self.closed_or_missing(session.id()).await);
        }

        sqlx::query(
            r#"
            INSERT INTO recorded_actions (id, encounter_id, action_type, details, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(closing_action.id().as_uuid())
        .bind(session.id().as_uuid())
        .bind(closing_action.action_type().as_str())
        .bind(Json(closing_action.details()))
        .bind(closing_action.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("insert closing action", e))?;

        tx.commit().await.map_err(|e| db_error("commit close", e))?;

        Ok(())
    }

    async fn list_sessions(&self, owner: &UserId) -> Result<Vec<EncounterSession>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, case_id, status, global_score, rime_details, started_at, ended_at
            FROM encounter_sessions
            WHERE user_id = $1
            ORDER BY started_at DESC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list encounters", e))?;

        rows.iter().map(row_to_session).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", context, e))
}

fn not_found(id: &EncounterId) -> DomainError {
    DomainError::new(ErrorCode::EncounterNotFound, "Encounter not found")
        .with_detail("encounter_id", id.to_string())
}

/// Inserts referencing a missing encounter surface as not-found.
fn insert_error(id: &EncounterId, context: &str, e: sqlx::Error) -> DomainError {
    let is_fk_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
    if is_fk_violation {
        not_found(id)
    } else {
        db_error(context, e)
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(format!("Failed to get {}: {}", name, e)))
}

fn corrupt(e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Corrupt row: {}", e))
}

fn row_to_session(row: &PgRow) -> Result<EncounterSession, DomainError> {
    let status: String = column(row, "status")?;
    let user_id: String = column(row, "user_id")?;
    let rime_details: Option<Json<RimeDetails>> = column(row, "rime_details")?;
    let ended_at: Option<chrono::DateTime<chrono::Utc>> = column(row, "ended_at")?;

    Ok(EncounterSession::reconstitute(
        EncounterId::from_uuid(column(row, "id")?),
        UserId::new(user_id).map_err(corrupt)?,
        CaseId::from_uuid(column(row, "case_id")?),
        status.parse::<EncounterStatus>().map_err(corrupt)?,
        column(row, "global_score")?,
        rime_details.map(|Json(d)| d),
        Timestamp::from_datetime(column(row, "started_at")?),
        ended_at.map(Timestamp::from_datetime),
    ))
}

fn row_to_turn(row: &PgRow) -> Result<Turn, DomainError> {
    let role: String = column(row, "role")?;

    Ok(Turn::reconstitute(
        TurnId::from_uuid(column(row, "id")?),
        EncounterId::from_uuid(column(row, "encounter_id")?),
        role.parse::<TurnRole>().map_err(corrupt)?,
        column(row, "content")?,
        Timestamp::from_datetime(column(row, "created_at")?),
    ))
}

fn row_to_action(row: &PgRow) -> Result<RecordedAction, DomainError> {
    let action_type: String = column(row, "action_type")?;
    let details: Json<Map<String, Value>> = column(row, "details")?;

    Ok(RecordedAction::reconstitute(
        ActionId::from_uuid(column(row, "id")?),
        EncounterId::from_uuid(column(row, "encounter_id")?),
        ActionType::new(action_type).map_err(corrupt)?,
        details.0,
        Timestamp::from_datetime(column(row, "created_at")?),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_roundtrip_through_column_text() {
        for status in [EncounterStatus::Open, EncounterStatus::Closed] {
            assert_eq!(status.as_str().parse::<EncounterStatus>().unwrap(), status);
        }
    }

    #[test]
    fn roles_roundtrip_through_column_text() {
        for role in [TurnRole::Doctor, TurnRole::Patient, TurnRole::System] {
            assert_eq!(role.as_str().parse::<TurnRole>().unwrap(), role);
        }
    }

    #[test]
    fn ordinary_actions_are_only_inserted_into_open_sessions() {
        let sql = INSERT_ACTION_IF_OPEN.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(sql.contains("SELECT $1, $2, $3, $4, $5 WHERE EXISTS"));
        assert!(sql.contains("WHERE id = $2 AND status = 'open'"));
    }

    #[test]
    fn non_database_errors_are_not_foreign_key_violations() {
        let id = EncounterId::new();
        let err = insert_error(&id, "insert turn", sqlx::Error::RowNotFound);
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
