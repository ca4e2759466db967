//! Artifact handler collaborators
//!
//! A [`HandlerFactory`] recognizes one artifact format family and builds
//! [`ArtifactHandler`]s for it. The session probes factories in the order they
//! were registered, oldest format family first; the first factory whose
//! [`is_loadable`](HandlerFactory::is_loadable) accepts a path wins.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use rand::rngs::StdRng;

use crate::log::LogSink;

/// Entry of an artifact's entity table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Index in the entity table
    pub number: u16,
    /// Display name
    pub name: String,
}

impl Entity {
    /// Create entity
    #[inline]
    #[must_use]
    pub fn new(number: u16, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
        }
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.number, self.name)
    }
}

/// Parsed, loaded artifact
///
/// Implementations own the artifact bytes and the random source they were
/// created with.
pub trait ArtifactHandler: Send {
    /// Read and parse the artifact at `path`
    ///
    /// # Errors
    /// Any I/O or format error.
    fn load_rom(&mut self, path: &Path) -> anyhow::Result<()>;

    /// Check the loaded artifact passed format validation
    fn is_rom_valid(&self) -> bool;

    /// Name recorded inside the artifact
    fn rom_name(&self) -> &str;

    /// Entity table; index 0 is a reserved placeholder
    fn entities(&self) -> &[Entity];

    /// The three starter entities in party order
    fn starters(&self) -> [Entity; 3];

    /// Format generation of the artifact
    fn generation(&self) -> u8;

    /// Bitmask of misc tweaks the artifact supports
    fn misc_tweaks_available(&self) -> i32;

    /// Route the handler's log output
    fn set_log(&mut self, log: LogSink);
}

/// Recognizes and builds handlers for one artifact format family
pub trait HandlerFactory: Send + Sync {
    /// Family name, for logs and errors
    fn name(&self) -> &'static str;

    /// Check whether this family can load `path`
    fn is_loadable(&self, path: &Path) -> bool;

    /// Build an unloaded handler drawing randomness from `rng`
    fn create(&self, rng: StdRng) -> Box<dyn ArtifactHandler>;
}
