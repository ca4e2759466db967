//! Error types for the settings layer
//!
//! - [`SettingsError`]: a single mutation or lookup was rejected
//! - [`SchemaError`]: a settings table is inconsistent (build-time)
//! - [`CodecError`]: a settings string could not be decoded
//! - [`NamesError`]: a custom names file could not be read or written

use std::path::PathBuf;

use crate::schema::SettingId;

/// Rejected setting lookup or mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No descriptor with this identifier
    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    /// Value kind does not match the descriptor kind
    #[error("type mismatch for {id}: expected {expected}, got {actual}")]
    TypeMismatch {
        id: SettingId,
        expected: &'static str,
        actual: &'static str,
    },

    /// Enumeration value outside the declared variants
    #[error("{value:?} is not a variant of {id}")]
    UnknownVariant { id: SettingId, value: String },

    /// Value outside the derived option set for the loaded artifact
    #[error("{value} is not offered for {id} with the loaded artifact")]
    NotOffered { id: SettingId, value: String },

    /// Integer that must not be clamped lies outside the declared range
    #[error("{value} is outside {min}..={max} for {id}")]
    OutOfRange { id: SettingId, value: i64, min: i32, max: i32 },

    /// Setting has no boolean gate to flip
    #[error("{0} has no gate setting")]
    NotGated(SettingId),
}

/// Inconsistent settings table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two descriptors share an identifier
    #[error("duplicate setting identifier: {0}")]
    DuplicateId(SettingId),

    /// Gate refers to a missing setting
    #[error("{setting} is gated by unknown setting {gate}")]
    UnknownGate { setting: SettingId, gate: SettingId },

    /// Gate refers to a non-boolean setting
    #[error("{setting} is gated by non-boolean setting {gate}")]
    GateNotBoolean { setting: SettingId, gate: SettingId },

    /// Default value is outside the setting's own domain
    #[error("default value of {0} is outside its domain")]
    InvalidDefault(SettingId),

    /// Empty range or empty variant list
    #[error("{0} has an empty domain")]
    EmptyDomain(SettingId),

    /// Derivation attached to a boolean setting
    #[error("{0} cannot carry a derived option set")]
    InvalidDerivation(SettingId),
}

/// Settings string decode failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Header or payload could not be parsed
    #[error("malformed settings string: {0}")]
    MalformedInput(String),

    /// Written by a newer release than this build
    #[error(
        "settings string was created by a newer release (format {found:03}, this release reads up to {current:03})"
    )]
    UnsupportedVersion { found: u16, current: u16 },

    /// Migration chain has a gap
    #[error("no migration step from format {0:03}")]
    MissingMigration(u16),

    /// A migration step rejected the payload
    #[error("migration from format {from:03} failed: {reason}")]
    MigrationFailed { from: u16, reason: String },

    /// Payload carried a value the schema rejects
    #[error("invalid value in settings string: {0}")]
    InvalidValue(#[from] SettingsError),
}

/// Custom names file failure
#[derive(Debug, thiserror::Error)]
pub enum NamesError {
    /// File could not be read or written
    #[error("custom names file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid names file
    #[error("invalid custom names file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Names could not be rendered as TOML
    #[error("cannot serialize custom names: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl CodecError {
    /// Check if the string came from a newer release
    #[inline]
    #[must_use]
    pub fn is_newer_release(&self) -> bool {
        matches!(self, Self::UnsupportedVersion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_version_names_newer_release() {
        let err = CodecError::UnsupportedVersion {
            found: 7,
            current: 3,
        };
        let msg = err.to_string();

        assert!(msg.contains("newer release"));
        assert!(msg.contains("007"));
        assert!(err.is_newer_release());
    }
}
