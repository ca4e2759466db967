//! Session configuration
//!
//! Loaded from TOML; every field is optional and falls back to its default.
//!
//! ```toml
//! highest_generation = 8
//! batch_safety_factor = 3
//! log_capacity = 1048576
//! seed_radix = 16
//! custom_names_path = "customnames.toml"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rndpk_settings::HIGHEST_GENERATION;

use crate::error::SessionError;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Highest artifact generation used for derived option sets
    pub highest_generation: u8,
    /// Divisor applied when estimating batch capacity
    pub batch_safety_factor: u64,
    /// Bytes of run log kept in memory
    pub log_capacity: usize,
    /// Radix used to display seeds
    pub seed_radix: u32,
    /// Custom name lists read when the session starts
    pub custom_names_path: Option<PathBuf>,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With highest generation
    #[inline]
    #[must_use]
    pub fn with_highest_generation(mut self, generation: u8) -> Self {
        self.highest_generation = generation;
        self
    }

    /// With batch safety factor
    #[inline]
    #[must_use]
    pub fn with_batch_safety_factor(mut self, factor: u64) -> Self {
        self.batch_safety_factor = factor;
        self
    }

    /// With in-memory log capacity
    #[inline]
    #[must_use]
    pub fn with_log_capacity(mut self, bytes: usize) -> Self {
        self.log_capacity = bytes;
        self
    }

    /// With seed display radix
    #[inline]
    #[must_use]
    pub fn with_seed_radix(mut self, radix: u32) -> Self {
        self.seed_radix = radix;
        self
    }

    /// With custom names file
    #[inline]
    #[must_use]
    pub fn with_custom_names_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom_names_path = Some(path.into());
        self
    }

    /// Check field ranges
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), SessionError> {
        if !(1..=HIGHEST_GENERATION).contains(&self.highest_generation) {
            return Err(SessionError::InvalidConfig(format!(
                "highest_generation must be in 1..={HIGHEST_GENERATION}, got {}",
                self.highest_generation
            )));
        }
        if self.batch_safety_factor == 0 {
            return Err(SessionError::InvalidConfig(
                "batch_safety_factor must be positive".to_string(),
            ));
        }
        if self.log_capacity == 0 {
            return Err(SessionError::InvalidConfig("log_capacity must be positive".to_string()));
        }
        if !(2..=36).contains(&self.seed_radix) {
            return Err(SessionError::InvalidConfig(format!(
                "seed_radix must be in 2..=36, got {}",
                self.seed_radix
            )));
        }
        Ok(())
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Parse failures and out-of-range fields are `InvalidConfig`.
    pub fn from_toml_str(text: &str) -> Result<Self, SessionError> {
        let config: Self = toml::from_str(text).map_err(|e| SessionError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// I/O failures plus everything [`SessionConfig::from_toml_str`] rejects.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded session config from {}", path.display());
        Ok(config)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            highest_generation: HIGHEST_GENERATION,
            batch_safety_factor: 3,
            log_capacity: 1024 * 1024,
            seed_radix: 16,
            custom_names_path: None,
        }
    }
}
