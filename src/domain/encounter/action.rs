//! Non-conversational events recorded during an encounter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::domain::foundation::{ActionId, EncounterId, Timestamp, ValidationError};

/// Free-form action tag.
///
/// Exactly one value, [`ActionType::CLOSING`], ends the encounter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionType(String);

impl ActionType {
    /// The reserved tag that closes an encounter and triggers evaluation.
    pub const CLOSING: &'static str = "DIAGNOSTIC_FINAL";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("action_type"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The closing action tag.
    pub fn closing() -> Self {
        Self(Self::CLOSING.to_string())
    }

    pub fn is_closing(&self) -> bool {
        self.0 == Self::CLOSING
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recorded action with its opaque detail document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAction {
    id: ActionId,
    encounter_id: EncounterId,
    action_type: ActionType,
    details: Map<String, Value>,
    created_at: Timestamp,
}

impl RecordedAction {
    pub fn new(encounter_id: EncounterId, action_type: ActionType, details: Map<String, Value>) -> Self {
        Self {
            id: ActionId::new(),
            encounter_id,
            action_type,
            details,
            created_at: Timestamp::now(),
        }
    }

    pub fn reconstitute(
        id: ActionId,
        encounter_id: EncounterId,
        action_type: ActionType,
        details: Map<String, Value>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            encounter_id,
            action_type,
            details,
            created_at,
        }
    }

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    pub fn encounter_id(&self) -> &EncounterId {
        &self.encounter_id
    }

    pub fn action_type(&self) -> &ActionType {
        &self.action_type
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_tag_is_recognised() {
        assert!(ActionType::new("DIAGNOSTIC_FINAL").unwrap().is_closing());
        assert!(ActionType::closing().is_closing());
    }

    #[test]
    fn other_tags_do_not_close() {
        assert!(!ActionType::new("EXAMEN").unwrap().is_closing());
        assert!(!ActionType::new("diagnostic_final").unwrap().is_closing());
    }

    #[test]
    fn blank_tag_is_rejected() {
        assert_eq!(
            ActionType::new("  "),
            Err(ValidationError::empty_field("action_type"))
        );
    }

    #[test]
    fn tag_is_trimmed() {
        assert!(ActionType::new(" DIAGNOSTIC_FINAL\n").unwrap().is_closing());
    }
}
