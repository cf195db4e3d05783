//! EncounterStatus enum for the lifecycle of a simulated encounter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{StateMachine, ValidationError};

/// Lifecycle status of an encounter.
///
/// `Open` is initial; `Closed` is terminal and is reached only through the
/// reserved closing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EncounterStatus {
    #[default]
    Open,
    Closed,
}

impl EncounterStatus {
    /// Returns true while turns and actions may still be appended.
    pub fn is_open(&self) -> bool {
        matches!(self, EncounterStatus::Open)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EncounterStatus::Open => "open",
            EncounterStatus::Closed => "closed",
        }
    }
}

impl StateMachine for EncounterStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (EncounterStatus::Open, EncounterStatus::Closed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            EncounterStatus::Open => vec![EncounterStatus::Closed],
            EncounterStatus::Closed => vec![],
        }
    }
}

impl fmt::Display for EncounterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EncounterStatus::Open => "Open",
            EncounterStatus::Closed => "Closed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EncounterStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(EncounterStatus::Open),
            "closed" => Ok(EncounterStatus::Closed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown encounter status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_open() {
        assert_eq!(EncounterStatus::default(), EncounterStatus::Open);
    }

    #[test]
    fn open_transitions_to_closed() {
        let next = EncounterStatus::Open
            .transition_to(EncounterStatus::Closed)
            .unwrap();
        assert_eq!(next, EncounterStatus::Closed);
    }

    #[test]
    fn closed_is_terminal() {
        assert!(EncounterStatus::Closed.is_terminal());
        assert!(EncounterStatus::Closed
            .transition_to(EncounterStatus::Open)
            .is_err());
        assert!(EncounterStatus::Closed
            .transition_to(EncounterStatus::Closed)
            .is_err());
    }

    #[test]
    fn open_cannot_reopen() {
        assert!(!EncounterStatus::Open.can_transition_to(&EncounterStatus::Open));
    }

    #[test]
    fn parses_storage_representation() {
        assert_eq!("open".parse::<EncounterStatus>().unwrap(), EncounterStatus::Open);
        assert_eq!(
            EncounterStatus::Closed.as_str().parse::<EncounterStatus>().unwrap(),
            EncounterStatus::Closed
        );
        assert!("archived".parse::<EncounterStatus>().is_err());
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&EncounterStatus::Closed).unwrap(),
            "\"closed\""
        );
    }
}
