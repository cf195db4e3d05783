//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier newtype with the standard constructors,
/// `Display`, `FromStr` and `Default` (random) implementations.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for one learner's attempt at a simulated case.
    EncounterId
);

uuid_id!(
    /// Unique identifier for a clinical case in the catalog.
    CaseId
);

uuid_id!(
    /// Unique identifier for a conversation turn.
    TurnId
);

uuid_id!(
    /// Unique identifier for a recorded action.
    ActionId
);

/// Learner identifier, issued by the external authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a UserId, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encounter_id_roundtrips_through_string() {
        let id = EncounterId::new();
        let parsed: EncounterId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn encounter_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<EncounterId>().is_err());
    }

    #[test]
    fn distinct_ids_are_unique() {
        assert_ne!(CaseId::new(), CaseId::new());
        assert_ne!(TurnId::new(), TurnId::new());
    }

    #[test]
    fn ids_serialize_transparently() {
        let uuid = Uuid::new_v4();
        let id = ActionId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn user_id_rejects_blank() {
        assert!(UserId::new("   ").is_err());
        assert!(UserId::new("").is_err());
    }

    #[test]
    fn user_id_keeps_value() {
        let id = UserId::new("learner-42").unwrap();
        assert_eq!(id.as_str(), "learner-42");
        assert_eq!(id.to_string(), "learner-42");
    }
}
