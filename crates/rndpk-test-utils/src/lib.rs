//! Testing utilities for the RndPk workspace
//!
//! Fakes for the session's collaborators plus fixtures:
//! - [`FakeFactory`] / [`FakeHandler`]: recognize artifacts by extension
//! - [`RecordingRandomizer`]: records every run, can fail or panic on demand
//! - [`FixedMemory`]: a memory probe with fixed figures

#![allow(missing_docs)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rndpk_session::{ArtifactHandler, Entity, HandlerFactory, LogSink, MemoryProbe, Randomizer, Session, SessionConfig};
use rndpk_settings::Snapshot;
use tempfile::TempDir;

/// Entity table of a small first-generation artifact; index 0 is reserved
pub fn kanto_entities() -> Vec<Entity> {
    [
        "",
        "Bulbasaur",
        "Ivysaur",
        "Venusaur",
        "Charmander",
        "Charmeleon",
        "Charizard",
        "Squirtle",
        "Wartortle",
        "Blastoise",
        "Pidgey",
        "Pidgeotto",
        "Pikachu",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Entity::new(u16::try_from(i).unwrap(), *name))
    .collect()
}

/// Entity table of a small second-generation artifact; index 0 is reserved
pub fn johto_entities() -> Vec<Entity> {
    [
        "",
        "Chikorita",
        "Bayleef",
        "Meganium",
        "Cyndaquil",
        "Quilava",
        "Typhlosion",
        "Totodile",
        "Croconaw",
        "Feraligatr",
        "Sentret",
        "Furret",
        "Hoothoot",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Entity::new(u16::try_from(i).unwrap(), *name))
    .collect()
}

/// Artifact description a [`FakeHandler`] reports after loading
#[derive(Debug, Clone)]
pub struct FakeRom {
    pub name: String,
    pub generation: u8,
    pub entities: Vec<Entity>,
    pub starters: [u16; 3],
    pub misc_tweaks: i32,
}

impl FakeRom {
    pub fn new(name: &str, generation: u8) -> Self {
        Self {
            name: name.to_string(),
            generation,
            entities: kanto_entities(),
            starters: [1, 4, 7],
            misc_tweaks: 0,
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_misc_tweaks(mut self, mask: i32) -> Self {
        self.misc_tweaks = mask;
        self
    }
}

/// Handler built by [`FakeFactory`]
pub struct FakeHandler {
    rom: FakeRom,
    loaded: bool,
    fail_load: bool,
    invalid: bool,
}

impl ArtifactHandler for FakeHandler {
    fn load_rom(&mut self, path: &Path) -> anyhow::Result<()> {
        if self.fail_load {
            anyhow::bail!("unreadable header in {}", path.display());
        }
        std::fs::metadata(path)?;
        self.loaded = true;
        Ok(())
    }

    fn is_rom_valid(&self) -> bool {
        self.loaded && !self.invalid
    }

    fn rom_name(&self) -> &str {
        &self.rom.name
    }

    fn entities(&self) -> &[Entity] {
        &self.rom.entities
    }

    fn starters(&self) -> [Entity; 3] {
        self.rom.starters.map(|n| self.rom.entities[usize::from(n)].clone())
    }

    fn generation(&self) -> u8 {
        self.rom.generation
    }

    fn misc_tweaks_available(&self) -> i32 {
        self.rom.misc_tweaks
    }

    fn set_log(&mut self, mut log: LogSink) {
        // A closed sink only loses this line
        let _ = writeln!(log, "Handler ready for {}", self.rom.name);
    }
}

/// Factory accepting paths with one extension
///
/// Clones share their counters and switches, so a test can keep a clone
/// after moving the factory into a session.
#[derive(Debug, Clone)]
pub struct FakeFactory {
    name: &'static str,
    extension: &'static str,
    rom: FakeRom,
    created: Arc<AtomicUsize>,
    fail_load: Arc<AtomicBool>,
    invalid: Arc<AtomicBool>,
}

impl FakeFactory {
    pub fn new(name: &'static str, extension: &'static str, rom: FakeRom) -> Self {
        Self {
            name,
            extension,
            rom,
            created: Arc::new(AtomicUsize::new(0)),
            fail_load: Arc::new(AtomicBool::new(false)),
            invalid: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of handlers created so far
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Make later handlers fail in `load_rom`
    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    /// Make later handlers report an invalid artifact
    pub fn set_invalid(&self, invalid: bool) {
        self.invalid.store(invalid, Ordering::SeqCst);
    }
}

impl HandlerFactory for FakeFactory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_loadable(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == self.extension)
    }

    fn create(&self, _rng: StdRng) -> Box<dyn ArtifactHandler> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeHandler {
            rom: self.rom.clone(),
            loaded: false,
            fail_load: self.fail_load.load(Ordering::SeqCst),
            invalid: self.invalid.load(Ordering::SeqCst),
        })
    }
}

/// What a [`RecordingRandomizer`] does when run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail(String),
    Panic(String),
}

/// One recorded run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub rom_name: String,
    pub seed: u64,
    pub output: PathBuf,
    pub settings: Snapshot,
}

/// Randomizer that records its inputs
#[derive(Debug, Clone)]
pub struct RecordingRandomizer {
    behavior: Arc<Mutex<Behavior>>,
    runs: Arc<Mutex<Vec<Run>>>,
}

impl RecordingRandomizer {
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Succeed)
    }

    pub fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            runs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn runs(&self) -> Vec<Run> {
        self.runs.lock().clone()
    }
}

impl Default for RecordingRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer for RecordingRandomizer {
    fn randomize(
        &self,
        handler: &mut dyn ArtifactHandler,
        settings: &Snapshot,
        output: &Path,
        log: &mut LogSink,
        seed: u64,
    ) -> anyhow::Result<()> {
        self.runs.lock().push(Run {
            rom_name: handler.rom_name().to_string(),
            seed,
            output: output.to_path_buf(),
            settings: settings.clone(),
        });
        writeln!(log, "Randomizing {} with seed {seed:x}", handler.rom_name())?;

        let behavior = self.behavior.lock().clone();
        match behavior {
            Behavior::Succeed => {
                std::fs::write(output, b"randomized")?;
                writeln!(log, "Saved {}", output.display())?;
                Ok(())
            }
            Behavior::Fail(reason) => anyhow::bail!(reason),
            Behavior::Panic(message) => panic!("{message}"),
        }
    }
}

/// Memory probe with fixed figures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMemory {
    pub max: u64,
    pub total: u64,
    pub free: u64,
}

impl FixedMemory {
    /// Probe reporting exactly `available` bytes obtainable
    pub fn available(available: u64) -> Self {
        Self {
            max: available,
            total: 0,
            free: 0,
        }
    }
}

impl MemoryProbe for FixedMemory {
    fn max_memory(&self) -> u64 {
        self.max
    }

    fn total_memory(&self) -> u64 {
        self.total
    }

    fn free_memory(&self) -> u64 {
        self.free
    }
}

/// Write an artifact file of `size` bytes
pub fn write_rom(dir: &Path, file_name: &str, size: usize) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, vec![0_u8; size]).unwrap();
    path
}

/// Session fixture with first- and second-generation fake factories
pub struct Fixture {
    pub dir: TempDir,
    pub gen1: FakeFactory,
    pub gen2: FakeFactory,
    pub randomizer: RecordingRandomizer,
    pub session: Session,
}

pub fn setup_session() -> Fixture {
    setup_session_with(SessionConfig::default())
}

pub fn setup_session_with(config: SessionConfig) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let gen1 = FakeFactory::new("Gen1", "gb", FakeRom::new("Pokemon Red", 1));
    let gen2 = FakeFactory::new(
        "Gen2",
        "gbc",
        FakeRom::new("Pokemon Crystal", 2)
            .with_entities(johto_entities())
            .with_misc_tweaks(0b110),
    );
    let randomizer = RecordingRandomizer::new();
    let session = Session::new(config, randomizer.clone())
        .unwrap()
        .with_factory(gen1.clone())
        .with_factory(gen2.clone());
    Fixture {
        dir,
        gen1,
        gen2,
        randomizer,
        session,
    }
}
