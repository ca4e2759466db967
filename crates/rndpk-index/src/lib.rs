//! RndPk Index - entity name lookup
//!
//! Provides [`NameTrie`], a case-insensitive prefix trie used to resolve
//! free-text entity names (starter selection, search boxes) against the
//! loaded artifact's entity table.
//!
//! # Example
//!
//! ```rust
//! use rndpk_index::NameTrie;
//!
//! let mut trie = NameTrie::new();
//! for name in ["Pikachu", "Pidgey", "Pidgeotto"] {
//!     trie.insert(name);
//! }
//! assert_eq!(trie.complete("pid"), vec!["Pidgeotto", "Pidgey"]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod trie;

pub use trie::{Completions, NameTrie, TrieNode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
