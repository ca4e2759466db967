//! The randomization session
//!
//! A [`Session`] owns the settings registry, the entity name index and the
//! loaded artifact. It is the single mutator of all three:
//! - loading an artifact probes the factories, refreshes derived options and
//!   rebuilds the name index
//! - every run builds a fresh handler and hands the randomizer a copy of the
//!   active settings
//! - failed operations leave the session as it was

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use rndpk_index::NameTrie;
use rndpk_settings::{codec, Codec, CustomNames, GenRestrictions, MiscTweak, SettingDescriptor, SettingsRegistry};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::handler::{ArtifactHandler, Entity, HandlerFactory};
use crate::log::{CloseOnDrop, LogBuffer, LogSink};
use crate::memory::{batch_capacity, MemoryProbe};
use crate::randomizer::Randomizer;
use crate::state::{validate_transition, SessionState};

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Generation assumed before any artifact is loaded
const DEFAULT_GENERATION: u8 = 1;

/// Outcome of a settings import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Format version of the imported string
    pub version: u16,
    /// Number of values written to the registry
    pub applied: usize,
    /// Artifact name recorded in the string
    pub rom_name: Option<String>,
    /// Recorded name differs from the loaded artifact
    pub rom_mismatch: bool,
}

struct LoadedArtifact {
    path: PathBuf,
    factory: usize,
    handler: Box<dyn ArtifactHandler>,
    seed: u64,
    file_size: u64,
}

/// Seeded randomization session over one artifact at a time
pub struct Session {
    config: SessionConfig,
    factories: Vec<Box<dyn HandlerFactory>>,
    randomizer: Box<dyn Randomizer>,
    registry: SettingsRegistry,
    codec: Codec,
    names: NameTrie,
    state: SessionState,
    loaded: Option<LoadedArtifact>,
    output_log: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("factories", &self.factories.iter().map(|f| f.name()).collect::<Vec<_>>())
            .field("artifact", &self.loaded.as_ref().map(|l| &l.path))
            .field("seed", &self.seed())
            .finish_non_exhaustive()
    }
}

/// Render a seed in `radix` (2 to 36, lower-case digits)
#[must_use]
pub fn format_seed(seed: u64, radix: u32) -> String {
    let radix = radix.clamp(2, 36);
    let base = u64::from(radix);
    let mut digits = Vec::new();
    let mut rest = seed;
    loop {
        let digit = u32::try_from(rest % base)
            .ok()
            .and_then(|d| char::from_digit(d, radix))
            .unwrap_or('0');
        digits.push(digit);
        rest /= base;
        if rest == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

/// Display name of a run's output: `{name}-{seed}.{extension}`
///
/// `name` is the artifact's file stem after its first `:`, if any.
#[must_use]
pub fn output_file_name(artifact: &Path, seed: u64, radix: u32) -> String {
    let stem = artifact.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = stem.split_once(':').map_or(&*stem, |(_, rest)| rest);
    let seed = format_seed(seed, radix);
    match artifact.extension() {
        Some(ext) => format!("{name}-{seed}.{}", ext.to_string_lossy()),
        None => format!("{name}-{seed}"),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn construct(factory: &dyn HandlerFactory, path: &Path, seed: u64) -> Result<Box<dyn ArtifactHandler>> {
    let mut handler = factory.create(StdRng::seed_from_u64(seed));
    let failed = |reason: String| SessionError::HandlerConstructionFailed {
        path: path.to_path_buf(),
        handler: factory.name(),
        reason,
    };
    handler.load_rom(path).map_err(|e| failed(format!("{e:#}")))?;
    if !handler.is_rom_valid() {
        tracing::warn!("{} loaded {} but the artifact is not valid", factory.name(), path.display());
    }
    Ok(handler)
}

impl Session {
    /// Create session with no factories registered
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: SessionConfig, randomizer: impl Randomizer + 'static) -> Result<Self> {
        config.validate()?;
        let mut registry = SettingsRegistry::with_builtin();
        if let Some(path) = &config.custom_names_path {
            registry.set_custom_names(CustomNames::load_or_default(path));
        }
        Ok(Self {
            config,
            factories: Vec::new(),
            randomizer: Box::new(randomizer),
            registry,
            codec: Codec::standard(),
            names: NameTrie::new(),
            state: SessionState::Empty,
            loaded: None,
            output_log: None,
        })
    }

    /// Register a factory after the ones already registered
    #[must_use]
    pub fn with_factory(mut self, factory: impl HandlerFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Register factories in priority order
    #[must_use]
    pub fn with_factories(mut self, factories: impl IntoIterator<Item = Box<dyn HandlerFactory>>) -> Self {
        self.factories.extend(factories);
        self
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Settings registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &SettingsRegistry {
        &self.registry
    }

    /// Settings registry, for mutation
    #[inline]
    pub fn registry_mut(&mut self) -> &mut SettingsRegistry {
        &mut self.registry
    }

    /// Entity name index of the loaded artifact
    #[inline]
    #[must_use]
    pub fn names(&self) -> &NameTrie {
        &self.names
    }

    /// Custom name lists carried by the settings
    #[inline]
    #[must_use]
    pub fn custom_names(&self) -> &CustomNames {
        self.registry.custom_names()
    }

    /// Replace the custom name lists with the contents of `path`
    ///
    /// # Errors
    /// [`SessionError::Names`] if the file cannot be read or parsed; the
    /// current lists are kept.
    pub fn load_custom_names(&mut self, path: &Path) -> Result<usize> {
        let names = CustomNames::load(path)?;
        let count = names.len();
        self.registry.set_custom_names(names);
        tracing::info!("Loaded {} custom names from {}", count, path.display());
        Ok(count)
    }

    /// Write the custom name lists to `path`
    ///
    /// # Errors
    /// [`SessionError::Names`] if the file cannot be written.
    pub fn save_custom_names(&self, path: &Path) -> Result<()> {
        self.registry.custom_names().save(path)?;
        Ok(())
    }

    /// Generation restrictions, limited to what the loaded artifact contains
    ///
    /// `None` while `limit_pokemon` is off.
    #[must_use]
    pub fn gen_restrictions(&self) -> Option<GenRestrictions> {
        self.registry
            .gen_restrictions()
            .map(|r| r.limit_to_gen(self.current_generation()))
    }

    /// Path of the loaded artifact
    #[must_use]
    pub fn artifact_path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.path.as_path())
    }

    /// Name recorded in the loaded artifact
    #[must_use]
    pub fn rom_name(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.handler.rom_name())
    }

    /// Check the loaded artifact passed its handler's validation
    ///
    /// An invalid artifact still loads; front ends decide whether to warn.
    #[must_use]
    pub fn is_artifact_valid(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.handler.is_rom_valid())
    }

    fn loaded(&self) -> Result<&LoadedArtifact> {
        self.loaded.as_ref().ok_or(SessionError::NoArtifactLoaded)
    }

    /// Load an artifact, replacing the current one
    ///
    /// Factories are probed in registration order; the first that accepts
    /// the path builds the handler. On success a fresh random seed is
    /// assigned, derived options are recomputed, the name index is rebuilt
    /// and the artifact's starters become the custom starters.
    ///
    /// # Errors
    /// `NoCapableHandler` or `HandlerConstructionFailed`; the session is
    /// unchanged on error.
    pub fn load_artifact(&mut self, path: &Path) -> Result<()> {
        validate_transition(self.state, SessionState::Ready)?;

        let Some(index) = self.factories.iter().position(|f| f.is_loadable(path)) else {
            tracing::warn!("No handler can load {}", path.display());
            return Err(SessionError::NoCapableHandler(path.to_path_buf()));
        };
        let factory = self.factories[index].as_ref();
        tracing::info!("Loading {} with {}", path.display(), factory.name());

        let seed: u64 = rand::random();
        let handler = construct(factory, path, seed).map_err(|e| {
            tracing::error!("{}", e);
            e
        })?;
        let file_size = fs::metadata(path)?.len();

        self.names
            .rebuild(handler.entities().iter().skip(1).map(|e| e.name.as_str()));
        self.registry
            .refresh_derived(handler.generation(), self.config.highest_generation);
        let starters = handler.starters().map(|e| i32::from(e.number));
        if let Err(e) = self.registry.set_custom_starters(starters) {
            tracing::warn!("Ignoring starters of {}: {}", handler.rom_name(), e);
        }
        self.registry.set_rom_name(Some(handler.rom_name().to_string()));

        tracing::info!(
            "Loaded {} (generation {}, {} entities, seed {})",
            handler.rom_name(),
            handler.generation(),
            self.names.len(),
            format_seed(seed, self.config.seed_radix)
        );
        self.loaded = Some(LoadedArtifact {
            path: path.to_path_buf(),
            factory: index,
            handler,
            seed,
            file_size,
        });
        self.output_log = None;
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Rebuild the bound handler from the loaded artifact
    ///
    /// # Errors
    /// On failure the previous handler stays bound.
    pub fn reload_handler(&mut self) -> Result<()> {
        validate_transition(self.state, SessionState::Ready)?;
        let loaded = self.loaded.as_ref().ok_or(SessionError::NoArtifactLoaded)?;
        let factory = self.factories[loaded.factory].as_ref();

        match construct(factory, &loaded.path, loaded.seed) {
            Ok(handler) => {
                tracing::info!("Reloaded handler for {}", loaded.path.display());
                if let Some(loaded) = self.loaded.as_mut() {
                    loaded.handler = handler;
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Keeping previous handler: {}", e);
                Err(e)
            }
        }
    }

    /// Seed of the next run
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.loaded.as_ref().map(|l| l.seed)
    }

    /// Replace the seed
    ///
    /// # Errors
    /// Fails without a loaded artifact.
    pub fn set_seed(&mut self, seed: u64) -> Result<()> {
        let loaded = self.loaded.as_mut().ok_or(SessionError::NoArtifactLoaded)?;
        loaded.seed = seed;
        tracing::debug!("Seed set to {:x}", seed);
        Ok(())
    }

    /// Parse seed text in `radix` and make it the seed
    ///
    /// # Errors
    /// `SeedParseFailed` for bad text or a radix outside 2 to 36; the seed
    /// is unchanged.
    pub fn update_seed(&mut self, text: &str, radix: u32) -> Result<u64> {
        let parse_failed = || SessionError::SeedParseFailed {
            text: text.to_string(),
            radix,
        };
        if !(2..=36).contains(&radix) {
            return Err(parse_failed());
        }
        let seed = u64::from_str_radix(text.trim(), radix).map_err(|_| parse_failed())?;
        self.set_seed(seed)?;
        Ok(seed)
    }

    /// Seed in the configured display radix
    #[must_use]
    pub fn seed_text(&self) -> Option<String> {
        self.seed().map(|s| format_seed(s, self.config.seed_radix))
    }

    /// Display name for the output of the next run
    ///
    /// # Errors
    /// Fails without a loaded artifact.
    pub fn output_file_name(&self) -> Result<String> {
        let loaded = self.loaded()?;
        Ok(output_file_name(&loaded.path, loaded.seed, self.config.seed_radix))
    }

    /// Soft upper bound on concurrent copies of the loaded artifact
    ///
    /// # Errors
    /// Fails without a loaded artifact.
    pub fn estimate_batch_capacity(&self, probe: &dyn MemoryProbe) -> Result<u64> {
        let loaded = self.loaded()?;
        let available = probe.available_memory();
        let capacity = batch_capacity(available, loaded.file_size, self.config.batch_safety_factor);
        tracing::debug!(
            "Batch capacity {} ({} bytes available, {} byte artifact)",
            capacity,
            available,
            loaded.file_size
        );
        Ok(capacity)
    }

    /// Run the randomizer once and save to `output`
    ///
    /// A fresh handler is built from the loaded artifact with `seed`, and the
    /// randomizer receives a copy of the active settings. `log` (or a
    /// discarding sink) is closed on every exit path.
    ///
    /// # Errors
    /// `NoArtifactLoaded`, `HandlerConstructionFailed`, or
    /// `RandomizationFailed` when the randomizer errs or panics.
    pub fn randomize(&mut self, output: &Path, seed: u64, log: Option<LogSink>) -> Result<()> {
        let mut sink = log.unwrap_or_else(LogSink::discard);
        let _close = CloseOnDrop(sink.clone());

        let loaded = self.loaded()?;
        validate_transition(self.state, SessionState::Randomizing)?;
        let factory = self.factories[loaded.factory].as_ref();
        let mut handler = construct(factory, &loaded.path, seed)?;
        handler.set_log(sink.clone());
        let settings = self.registry.active_snapshot();

        tracing::info!(
            "Randomizing {} with seed {} into {} ({} active settings)",
            handler.rom_name(),
            format_seed(seed, self.config.seed_radix),
            output.display(),
            settings.len()
        );
        self.state = SessionState::Randomizing;
        let randomizer = &self.randomizer;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            randomizer.randomize(handler.as_mut(), &settings, output, &mut sink, seed)
        }));
        self.state = SessionState::Ready;

        match outcome {
            Ok(Ok(())) => {
                tracing::info!("Saved {}", output.display());
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!("Randomization failed: {:#}", e);
                Err(SessionError::RandomizationFailed(format!("{e:#}")))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Randomizer panicked: {}", message);
                Err(SessionError::RandomizationFailed(format!("randomizer panicked: {message}")))
            }
        }
    }

    /// Run with the current seed, capturing the log
    ///
    /// The captured log is available from [`Session::output_log`] whether
    /// the run succeeded or not.
    ///
    /// # Errors
    /// See [`Session::randomize`].
    pub fn randomize_current(&mut self, output: &Path) -> Result<()> {
        let seed = self.loaded()?.seed;
        let buffer = LogBuffer::with_capacity(self.config.log_capacity);
        let result = self.randomize(output, seed, Some(buffer.sink()));
        if buffer.is_truncated() {
            tracing::debug!("Run log truncated at {} bytes", self.config.log_capacity);
        }
        self.output_log = Some(buffer.contents());
        result
    }

    /// Log captured by the last [`Session::randomize_current`]
    #[must_use]
    pub fn output_log(&self) -> Option<&str> {
        self.output_log.as_deref()
    }

    /// Entity by case-insensitive exact name
    ///
    /// # Errors
    /// `NoArtifactLoaded` or `UnknownEntity`.
    pub fn find_entity(&self, name: &str) -> Result<&Entity> {
        let loaded = self.loaded()?;
        let unknown = || SessionError::UnknownEntity(name.to_string());
        let display = self.names.get(name).ok_or_else(unknown)?;
        loaded
            .handler
            .entities()
            .iter()
            .skip(1)
            .find(|e| e.name == display)
            .ok_or_else(unknown)
    }

    /// Entity names starting with `prefix`
    #[must_use]
    pub fn complete_entity(&self, prefix: &str) -> Vec<&str> {
        self.names.complete(prefix)
    }

    /// Resolve three names and store them as the custom starters
    ///
    /// # Errors
    /// Any unresolved name aborts with no starter changed.
    pub fn set_starters(&mut self, names: [&str; 3]) -> Result<()> {
        let mut numbers = [0; 3];
        for (slot, name) in numbers.iter_mut().zip(names) {
            *slot = i32::from(self.find_entity(name)?.number);
        }
        self.registry.set_custom_starters(numbers)?;
        tracing::info!("Custom starters set to {:?}", names);
        Ok(())
    }

    /// Starters of the loaded artifact
    #[must_use]
    pub fn current_starters(&self) -> Option<[Entity; 3]> {
        self.loaded.as_ref().map(|l| l.handler.starters())
    }

    /// Generation of the loaded artifact (1 when none is loaded)
    #[must_use]
    pub fn current_generation(&self) -> u8 {
        self.loaded
            .as_ref()
            .map_or(DEFAULT_GENERATION, |l| l.handler.generation())
    }

    /// Misc tweaks the loaded artifact supports
    #[must_use]
    pub fn available_misc_tweaks(&self) -> Vec<&'static MiscTweak> {
        self.loaded.as_ref().map_or_else(Vec::new, |l| {
            MiscTweak::available_in(l.handler.misc_tweaks_available()).collect()
        })
    }

    /// Settings supported by the loaded generation
    #[must_use]
    pub fn supported_settings(&self) -> Vec<&'static SettingDescriptor> {
        self.registry
            .schema()
            .supported(self.current_generation())
            .collect()
    }

    /// Encode the current settings
    #[must_use]
    pub fn export_settings(&self) -> String {
        codec::encode(&self.registry)
    }

    /// Decode a settings string and merge it into the registry
    ///
    /// Custom names carried by the string replace the current lists; a
    /// string without them leaves the lists alone.
    ///
    /// A string recorded for a different artifact is still applied; the
    /// mismatch is logged and reported.
    ///
    /// # Errors
    /// Decode and merge failures; the registry is unchanged on error.
    pub fn import_settings(&mut self, text: &str) -> Result<ImportReport> {
        let decoded = self.codec.decode(text, self.registry.schema()).map_err(|e| {
            tracing::warn!("Rejected settings string: {}", e);
            e
        })?;
        let applied = self.registry.merge(&decoded.values)?;
        if let Some(names) = decoded.custom_names {
            self.registry.set_custom_names(names);
        }

        let rom_mismatch = match (decoded.rom_name.as_deref(), self.rom_name()) {
            (Some(recorded), Some(loaded)) if recorded != loaded => {
                tracing::warn!("Settings were made for {}, loaded artifact is {}", recorded, loaded);
                true
            }
            _ => false,
        };
        Ok(ImportReport {
            version: decoded.version,
            applied,
            rom_name: decoded.rom_name,
            rom_mismatch,
        })
    }
}
