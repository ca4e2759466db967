//! Randomizer collaborator

use std::path::Path;

use rndpk_settings::Snapshot;

use crate::handler::ArtifactHandler;
use crate::log::LogSink;

/// Applies a settings snapshot to a loaded artifact and writes the result
///
/// The session hands over a fresh handler, a copy of the active settings and
/// the run seed. Errors and panics are both reported to the caller as a
/// failed run.
pub trait Randomizer: Send + Sync {
    /// Randomize and save to `output`
    ///
    /// # Errors
    /// Any failure while randomizing or saving.
    fn randomize(
        &self,
        handler: &mut dyn ArtifactHandler,
        settings: &Snapshot,
        output: &Path,
        log: &mut LogSink,
        seed: u64,
    ) -> anyhow::Result<()>;
}
