//! Lifecycle enums with an explicit edge table.

use super::ValidationError;

/// An enum whose values move only along declared edges.
///
/// Implementors provide `successors`; everything else derives from it.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    /// States reachable from `self` in one step.
    fn successors(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.successors().contains(target)
    }

    /// Returns `target` if the edge exists.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("{:?} -> {:?} is not allowed", self, target),
            ))
        }
    }

    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}
