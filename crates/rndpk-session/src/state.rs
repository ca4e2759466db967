//! Session lifecycle
//!
//! ```text
//! Empty --load--> Ready --randomize--> Randomizing --done--> Ready
//!                   ^ |
//!                   +-+ load / reload
//! ```

use std::fmt::{self, Display, Formatter};

use crate::error::SessionError;

/// Lifecycle state of a [`Session`](crate::Session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No artifact loaded
    Empty,
    /// Artifact loaded, handler bound, seed assigned
    Ready,
    /// A randomization run is in progress
    Randomizing,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Ready => "ready",
            Self::Randomizing => "randomizing",
        })
    }
}

/// Validate a lifecycle transition
///
/// # Errors
/// Returns [`SessionError::IllegalTransition`] for transitions outside
/// [`allowed_transitions`].
pub fn validate_transition(from: SessionState, to: SessionState) -> Result<(), SessionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SessionError::IllegalTransition { from, to })
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: SessionState) -> &'static [SessionState] {
    use SessionState::{Empty, Randomizing, Ready};
    match from {
        Empty => &[Ready],
        Ready => &[Ready, Randomizing],
        Randomizing => &[Ready],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_only_loads() {
        assert!(validate_transition(SessionState::Empty, SessionState::Ready).is_ok());
        assert!(validate_transition(SessionState::Empty, SessionState::Randomizing).is_err());
    }

    #[test]
    fn randomizing_returns_to_ready() {
        assert!(validate_transition(SessionState::Randomizing, SessionState::Ready).is_ok());
        assert!(validate_transition(SessionState::Randomizing, SessionState::Randomizing).is_err());
    }
}
