//! Custom name lists
//!
//! User-supplied names the randomizer draws from when renaming trainers and
//! nicknaming entities. The lists live in a TOML file next to the
//! application data and travel inside settings strings under the reserved
//! [`NAMES_TAG`] field:
//!
//! ```toml
//! trainer_names = ["Ash", "Gary"]
//! pokemon_nicknames = ["Sparky"]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::NamesError;

/// Reserved settings-string field carrying the custom names
pub const NAMES_TAG: &str = "@names";

/// One titled list of a [`CustomNames`] set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameList {
    TrainerNames,
    TrainerClasses,
    DoublesTrainerNames,
    DoublesTrainerClasses,
    PokemonNicknames,
}

impl NameList {
    /// All lists in display order
    pub const ALL: [NameList; 5] = [
        NameList::TrainerNames,
        NameList::TrainerClasses,
        NameList::DoublesTrainerNames,
        NameList::DoublesTrainerClasses,
        NameList::PokemonNicknames,
    ];

    /// Human-readable title
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::TrainerNames => "Trainer Names",
            Self::TrainerClasses => "Trainer Classes",
            Self::DoublesTrainerNames => "Double Battle Trainer Names",
            Self::DoublesTrainerClasses => "Double Battle Trainer Classes",
            Self::PokemonNicknames => "Pokemon Nicknames",
        }
    }
}

/// Editable custom name lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomNames {
    trainer_names: Vec<String>,
    trainer_classes: Vec<String>,
    doubles_trainer_names: Vec<String>,
    doubles_trainer_classes: Vec<String>,
    pokemon_nicknames: Vec<String>,
}

impl CustomNames {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML names file
    ///
    /// # Errors
    /// Returns [`NamesError::Parse`] for invalid TOML or wrong field types.
    pub fn from_toml_str(text: &str) -> Result<Self, NamesError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a names file
    ///
    /// # Errors
    /// [`NamesError::Io`] if the file cannot be read, [`NamesError::Parse`]
    /// if it is not a valid names file.
    pub fn load(path: &Path) -> Result<Self, NamesError> {
        let text = fs::read_to_string(path).map_err(|source| NamesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let names = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded {} custom names from {}", names.len(), path.display());
        Ok(names)
    }

    /// Read a names file, falling back to an empty set
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::error!("Unable to load custom names: {}", e);
            Self::default()
        })
    }

    /// Write the set as a TOML names file
    ///
    /// # Errors
    /// [`NamesError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), NamesError> {
        let text = toml::to_string(self)?;
        fs::write(path, text).map_err(|source| NamesError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Names of one list
    #[must_use]
    pub fn list(&self, list: NameList) -> &[String] {
        match list {
            NameList::TrainerNames => &self.trainer_names,
            NameList::TrainerClasses => &self.trainer_classes,
            NameList::DoublesTrainerNames => &self.doubles_trainer_names,
            NameList::DoublesTrainerClasses => &self.doubles_trainer_classes,
            NameList::PokemonNicknames => &self.pokemon_nicknames,
        }
    }

    /// Names of one list, for editing
    pub fn list_mut(&mut self, list: NameList) -> &mut Vec<String> {
        match list {
            NameList::TrainerNames => &mut self.trainer_names,
            NameList::TrainerClasses => &mut self.trainer_classes,
            NameList::DoublesTrainerNames => &mut self.doubles_trainer_names,
            NameList::DoublesTrainerClasses => &mut self.doubles_trainer_classes,
            NameList::PokemonNicknames => &mut self.pokemon_nicknames,
        }
    }

    /// `(title, names)` for every list in display order
    pub fn lists(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        NameList::ALL.into_iter().map(|list| (list.title(), self.list(list)))
    }

    /// Total names across all lists
    #[must_use]
    pub fn len(&self) -> usize {
        NameList::ALL.into_iter().map(|list| self.list(list).len()).sum()
    }

    /// Check if every list is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_lists_default_to_empty() {
        let names = CustomNames::from_toml_str(r#"trainer_names = ["Ash", "Gary"]"#).unwrap();

        assert_eq!(names.list(NameList::TrainerNames), ["Ash", "Gary"]);
        assert!(names.list(NameList::PokemonNicknames).is_empty());
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn lists_are_titled_in_display_order() {
        let names = CustomNames::new();
        let titles: Vec<_> = names.lists().map(|(title, _)| title).collect();

        assert_eq!(titles.first(), Some(&"Trainer Names"));
        assert_eq!(titles.last(), Some(&"Pokemon Nicknames"));
        assert_eq!(titles.len(), NameList::ALL.len());
    }

    #[test]
    fn lists_are_editable() {
        let mut names = CustomNames::new();
        names.list_mut(NameList::PokemonNicknames).push("Sparky".to_string());

        assert!(!names.is_empty());
        assert_eq!(names.list(NameList::PokemonNicknames), ["Sparky"]);
    }

    #[test]
    fn wrong_field_type_is_a_parse_error() {
        assert!(matches!(
            CustomNames::from_toml_str("trainer_names = 3"),
            Err(NamesError::Parse(_))
        ));
    }

    #[test]
    fn unreadable_file_falls_back_to_empty() {
        let names = CustomNames::load_or_default(Path::new("/nonexistent/customnames.toml"));
        assert!(names.is_empty());
    }
}
