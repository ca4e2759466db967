//! Error types for the session layer
//!
//! Every failed session operation leaves the session as it was before the
//! call. [`SessionError::is_recoverable`] tells a front end whether it can
//! simply report the error and carry on.

use std::path::PathBuf;

use rndpk_settings::{CodecError, NamesError, SettingsError};

use crate::state::SessionState;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No factory accepted the artifact
    #[error("no handler can load {}", .0.display())]
    NoCapableHandler(PathBuf),

    /// A factory accepted the artifact but its handler failed to load it
    #[error("{handler} failed to load {}: {reason}", .path.display())]
    HandlerConstructionFailed {
        path: PathBuf,
        handler: &'static str,
        reason: String,
    },

    /// The randomizer returned an error or panicked
    #[error("randomization failed: {0}")]
    RandomizationFailed(String),

    /// Seed text is not a number in the requested radix
    #[error("cannot parse seed {text:?} in base {radix}")]
    SeedParseFailed { text: String, radix: u32 },

    /// Operation needs a loaded artifact
    #[error("no artifact loaded")]
    NoArtifactLoaded,

    /// Name not found in the loaded artifact's entity table
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Settings string could not be decoded
    #[error("settings string error: {0}")]
    Codec(#[from] CodecError),

    /// Setting mutation rejected
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Session lifecycle violated
    #[error("illegal session transition {from} -> {to}")]
    IllegalTransition { from: SessionState, to: SessionState },

    /// Configuration rejected
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Custom names file could not be read or written
    #[error(transparent)]
    Names(#[from] NamesError),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Check if the session can keep going after this error
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::IllegalTransition { .. } | Self::InvalidConfig(_) | Self::Io(_)
        )
    }

    /// Check if a settings string came from a newer release
    #[inline]
    #[must_use]
    pub fn is_newer_release(&self) -> bool {
        matches!(self, Self::Codec(e) if e.is_newer_release())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors() {
        assert!(SessionError::NoArtifactLoaded.is_recoverable());
        assert!(SessionError::RandomizationFailed("boom".into()).is_recoverable());
        assert!(!SessionError::InvalidConfig("radix".into()).is_recoverable());
    }

    #[test]
    fn newer_release_passes_through() {
        let err = SessionError::from(CodecError::UnsupportedVersion {
            found: 4,
            current: 3,
        });
        assert!(err.is_newer_release());
        assert!(err.to_string().contains("newer release"));
    }

    #[test]
    fn construction_failure_names_handler() {
        let err = SessionError::HandlerConstructionFailed {
            path: PathBuf::from("red.gb"),
            handler: "Gen1",
            reason: "bad header".into(),
        };
        assert_eq!(err.to_string(), "Gen1 failed to load red.gb: bad header");
    }
}
