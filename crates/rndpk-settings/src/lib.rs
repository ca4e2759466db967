//! RndPk Settings - typed settings registry and versioned codec
//!
//! This crate owns everything a randomization run is configured with:
//! - The static [`Schema`] of every setting (kind, domain, toggle, category)
//! - The constraint engine: clamps, toggles and generation-dependent option sets
//! - The live [`SettingsRegistry`] that applies those constraints on every write
//! - The versioned settings-string [`codec`] with its migration chain
//! - Custom name lists and generation restrictions carried with the settings
//!
//! # Example
//!
//! ```rust
//! use rndpk_settings::prelude::*;
//! use rndpk_settings::schema::ids;
//!
//! let mut registry = SettingsRegistry::with_builtin();
//! registry.set(ids::WILD_LEVEL_MODIFIER, SettingValue::Int(75)).unwrap();
//! assert_eq!(registry.int(ids::WILD_LEVEL_MODIFIER).unwrap(), 50);
//!
//! let text = codec::encode(&registry);
//! let decoded = codec::decode(&text, registry.schema()).unwrap();
//! assert_eq!(decoded.values, registry.snapshot());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod codec;
pub mod constraint;
pub mod derived;
pub mod error;
pub mod migration;
pub mod names;
pub mod registry;
pub mod restrictions;
pub mod schema;
pub mod tweaks;
pub mod value;

pub use codec::{Codec, DecodedSettings, ROM_TAG};
pub use derived::{DerivedOptions, HIGHEST_GENERATION};
pub use error::{CodecError, NamesError, SchemaError, SettingsError};
pub use migration::{MigrationChain, MigrationStep, CURRENT_VERSION, FIRST_VERSION};
pub use names::{CustomNames, NameList, NAMES_TAG};
pub use registry::SettingsRegistry;
pub use restrictions::GenRestrictions;
pub use schema::{Category, Derivation, Schema, SettingDescriptor, SettingId, SettingKind, Toggle};
pub use tweaks::{MiscTweak, ALL_TWEAKS};
pub use value::{SettingValue, Snapshot};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with settings
    pub use crate::codec;
    pub use crate::{
        Codec, CodecError, CustomNames, DecodedSettings, GenRestrictions, Schema, SettingId, SettingValue,
        SettingsError, SettingsRegistry, Snapshot,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
