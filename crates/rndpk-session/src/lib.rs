//! RndPk Session - seeded randomization sessions
//!
//! Ties the settings registry to a loaded artifact:
//! - Probes [`HandlerFactory`]s to load an artifact and assign a seed
//! - Refreshes generation-dependent options and the entity name index
//! - Exports and imports versioned settings strings
//! - Runs the [`Randomizer`] with a fresh handler and a settings copy
//!
//! # Example
//!
//! ```rust,ignore
//! use rndpk_session::prelude::*;
//!
//! let mut session = Session::new(SessionConfig::default(), MyRandomizer)?
//!     .with_factory(Gen1Factory)
//!     .with_factory(Gen2Factory);
//!
//! session.load_artifact(Path::new("red.gb"))?;
//! session.update_seed("beef", 16)?;
//! session.randomize_current(Path::new("red-beef.gb"))?;
//! println!("{}", session.output_log().unwrap_or_default());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod handler;
pub mod log;
pub mod memory;
pub mod randomizer;
pub mod session;
pub mod state;

pub use config::SessionConfig;
pub use error::SessionError;
pub use handler::{ArtifactHandler, Entity, HandlerFactory};
pub use log::{LogBuffer, LogSink};
pub use memory::{batch_capacity, MemoryProbe, SystemMemory};
pub use randomizer::Randomizer;
pub use session::{format_seed, output_file_name, ImportReport, Session};
pub use state::{allowed_transitions, validate_transition, SessionState};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with sessions
    pub use crate::{
        ArtifactHandler, Entity, HandlerFactory, ImportReport, LogSink, MemoryProbe, Randomizer, Session,
        SessionConfig, SessionError, SessionState, SystemMemory,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
