//! Conversation turns exchanged during an encounter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{EncounterId, Timestamp, TurnId, ValidationError};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The learner, acting as the physician.
    Doctor,
    /// The simulated patient.
    Patient,
    /// Narration shown in the transcript, never sent to the model.
    System,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::Doctor => "doctor",
            TurnRole::Patient => "patient",
            TurnRole::System => "system",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TurnRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(TurnRole::Doctor),
            "patient" => Ok(TurnRole::Patient),
            "system" => Ok(TurnRole::System),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown turn role '{}'", other),
            )),
        }
    }
}

/// One persisted message in an encounter.
///
/// Turns are totally ordered by `created_at`; that order is the canonical
/// conversation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    id: TurnId,
    encounter_id: EncounterId,
    role: TurnRole,
    content: String,
    created_at: Timestamp,
}

impl Turn {
    /// Creates a new turn stamped with the current time.
    pub fn new(encounter_id: EncounterId, role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            encounter_id,
            role,
            content: content.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitutes a turn from persistence.
    pub fn reconstitute(
        id: TurnId,
        encounter_id: EncounterId,
        role: TurnRole,
        content: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            encounter_id,
            role,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> &TurnId {
        &self.id
    }

    pub fn encounter_id(&self) -> &EncounterId {
        &self.encounter_id
    }

    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_storage_values() {
        for role in [TurnRole::Doctor, TurnRole::Patient, TurnRole::System] {
            assert_eq!(role.as_str().parse::<TurnRole>().unwrap(), role);
        }
        assert!("nurse".parse::<TurnRole>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TurnRole::Doctor).unwrap(), "\"doctor\"");
    }

    #[test]
    fn new_turn_keeps_content_verbatim() {
        let turn = Turn::new(EncounterId::new(), TurnRole::Doctor, "  Bonjour  ");
        assert_eq!(turn.content(), "  Bonjour  ");
        assert_eq!(turn.role(), TurnRole::Doctor);
    }
}
