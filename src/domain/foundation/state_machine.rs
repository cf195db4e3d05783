//! State machine trait for lifecycle status enums.

use super::ValidationError;

/// A status enum with a fixed set of legal transitions.
///
/// Implementors list their edges; `transition_to` and `is_terminal`
/// come for free.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if moving from `self` to `target` is a legal edge.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// All states reachable in one step from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs a checked transition.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// A state with no outgoing edges.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
        Off,
    }

    impl StateMachine for Light {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Light::Red => vec![Light::Green, Light::Off],
                Light::Green => vec![Light::Red, Light::Off],
                Light::Off => vec![],
            }
        }
    }

    #[test]
    fn legal_transition_returns_target() {
        assert_eq!(Light::Red.transition_to(Light::Green), Ok(Light::Green));
    }

    #[test]
    fn illegal_transition_names_both_states() {
        let err = Light::Off.transition_to(Light::Red).unwrap_err();
        assert!(err.to_string().contains("Off"));
        assert!(err.to_string().contains("Red"));
    }

    #[test]
    fn terminal_state_has_no_edges() {
        assert!(Light::Off.is_terminal());
        assert!(!Light::Green.is_terminal());
    }
}
