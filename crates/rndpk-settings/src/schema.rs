//! Settings schema
//!
//! Every setting is declared once in a static table of
//! [`SettingDescriptor`]s. A [`Schema`] indexes a table by identifier and is
//! immutable after construction.
//!
//! # Example
//!
//! ```
//! use rndpk_settings::schema::{ids, Schema, SettingKind};
//!
//! let schema = Schema::builtin();
//! let desc = schema.get(ids::WILD_LEVEL_MODIFIER).unwrap();
//! assert_eq!(desc.kind, SettingKind::IntegerRange { min: -50, max: 50 });
//! ```

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::derived::HIGHEST_GENERATION;
use crate::error::SchemaError;
use crate::tweaks::ALL_TWEAKS_MASK;
use crate::value::SettingValue;

/// Stable setting identifier
///
/// Doubles as the field tag in encoded settings strings, so an identifier
/// must never be reused for a different meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SettingId(&'static str);

impl SettingId {
    /// Create identifier
    #[inline]
    #[must_use]
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    /// Identifier text
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Display for SettingId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Borrow<str> for SettingId {
    fn borrow(&self) -> &str {
        self.0
    }
}

/// Storage kind and domain of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingKind {
    /// On/off flag
    Boolean,
    /// Integer in `[min, max]` inclusive
    IntegerRange { min: i32, max: i32 },
    /// One of a fixed list of variant names
    Enumeration { variants: &'static [&'static str] },
}

impl SettingKind {
    /// Name of the kind, for diagnostics
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::IntegerRange { .. } => "integer",
            Self::Enumeration { .. } => "variant",
        }
    }

    /// Check that a value has this kind (ignores the domain)
    #[inline]
    #[must_use]
    pub fn matches(&self, value: &SettingValue) -> bool {
        matches!(
            (self, value),
            (Self::Boolean, SettingValue::Bool(_))
                | (Self::IntegerRange { .. }, SettingValue::Int(_))
                | (Self::Enumeration { .. }, SettingValue::Variant(_))
        )
    }

    /// Check that a value has this kind and lies in the domain
    #[must_use]
    pub fn contains(&self, value: &SettingValue) -> bool {
        match (self, value) {
            (Self::Boolean, SettingValue::Bool(_)) => true,
            (Self::IntegerRange { min, max }, SettingValue::Int(v)) => (*min..=*max).contains(v),
            (Self::Enumeration { variants }, SettingValue::Variant(v)) => variants.contains(v),
            _ => false,
        }
    }

    /// Resolve a variant name to the schema's `'static` spelling
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<&'static str> {
        match self {
            Self::Enumeration { variants } => variants.iter().copied().find(|v| *v == name),
            _ => None,
        }
    }
}

/// Toggle relationship of a controlled setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    /// Active only while the boolean gate is `true`
    Gate(SettingId),
    /// No gate declared; active while the stored value is non-zero
    NonZero,
}

/// Artifact-dependent option set attached to a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Derivation {
    /// Target generations for "update base stats"
    BaseStatGenerations,
    /// Target generations for "update moves"
    MoveGenerations,
    /// Experience curves available for standardization
    ExpCurves,
}

/// Grouping used by front ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BaseStats,
    Types,
    Abilities,
    Evolutions,
    Starters,
    Statics,
    Moves,
    Movesets,
    Trainers,
    Wild,
    TmsTutors,
    Items,
    Misc,
    Restrictions,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 14] = [
        Category::BaseStats,
        Category::Types,
        Category::Abilities,
        Category::Evolutions,
        Category::Starters,
        Category::Statics,
        Category::Moves,
        Category::Movesets,
        Category::Trainers,
        Category::Wild,
        Category::TmsTutors,
        Category::Items,
        Category::Misc,
        Category::Restrictions,
    ];

    /// Human-readable title
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::BaseStats => "Pokemon Base Statistics",
            Self::Types => "Pokemon Types",
            Self::Abilities => "Pokemon Abilities",
            Self::Evolutions => "Pokemon Evolutions",
            Self::Starters => "Starter Pokemon",
            Self::Statics => "Static Pokemon",
            Self::Moves => "Move Data",
            Self::Movesets => "Pokemon Movesets",
            Self::Trainers => "Trainer Pokemon",
            Self::Wild => "Wild Pokemon",
            Self::TmsTutors => "TMs & Move Tutors",
            Self::Items => "Field Items",
            Self::Misc => "Misc. Tweaks",
            Self::Restrictions => "Pokemon Restrictions",
        }
    }
}

/// Static description of one setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingDescriptor {
    /// Identifier and codec field tag
    pub id: SettingId,
    /// Kind and domain
    pub kind: SettingKind,
    /// Value at schema build
    pub default: SettingValue,
    /// Zero or one toggle relationship
    pub toggle: Option<Toggle>,
    /// Artifact-dependent option set, if any
    pub derivation: Option<Derivation>,
    /// Front-end grouping
    pub category: Category,
    /// Inclusive range of artifact generations supporting the setting
    pub generations: (u8, u8),
}

impl SettingDescriptor {
    const fn base(id: &'static str, category: Category, kind: SettingKind, default: SettingValue) -> Self {
        Self {
            id: SettingId::new(id),
            kind,
            default,
            toggle: None,
            derivation: None,
            category,
            generations: (1, HIGHEST_GENERATION),
        }
    }

    /// Boolean setting
    #[must_use]
    pub const fn flag(id: &'static str, category: Category, default: bool) -> Self {
        Self::base(id, category, SettingKind::Boolean, SettingValue::Bool(default))
    }

    /// Integer setting in `[min, max]`
    #[must_use]
    pub const fn range(id: &'static str, category: Category, min: i32, max: i32, default: i32) -> Self {
        Self::base(
            id,
            category,
            SettingKind::IntegerRange { min, max },
            SettingValue::Int(default),
        )
    }

    /// Enumeration setting defaulting to its first variant
    #[must_use]
    pub const fn choice(id: &'static str, category: Category, variants: &'static [&'static str]) -> Self {
        Self::base(
            id,
            category,
            SettingKind::Enumeration { variants },
            SettingValue::Variant(variants[0]),
        )
    }

    /// Gate this setting behind a boolean
    #[must_use]
    pub const fn gated_by(self, gate: SettingId) -> Self {
        Self {
            toggle: Some(Toggle::Gate(gate)),
            ..self
        }
    }

    /// Treat a zero value as disabled
    #[must_use]
    pub const fn active_when_nonzero(self) -> Self {
        Self {
            toggle: Some(Toggle::NonZero),
            ..self
        }
    }

    /// Attach an artifact-dependent option set
    #[must_use]
    pub const fn derived(self, derivation: Derivation) -> Self {
        Self {
            derivation: Some(derivation),
            ..self
        }
    }

    /// Restrict to a generation range
    #[must_use]
    pub const fn for_generations(self, first: u8, last: u8) -> Self {
        Self {
            generations: (first, last),
            ..self
        }
    }

    /// Check generation support
    #[inline]
    #[must_use]
    pub const fn supports(&self, generation: u8) -> bool {
        generation >= self.generations.0 && generation <= self.generations.1
    }
}

/// Setting identifiers of the built-in table
pub mod ids {
    use super::SettingId;

    pub const BASE_STATISTICS_MOD: SettingId = SettingId::new("base_statistics_mod");
    pub const BASE_STATS_FOLLOW_EVOLUTIONS: SettingId = SettingId::new("base_stats_follow_evolutions");
    pub const UPDATE_BASE_STATS: SettingId = SettingId::new("update_base_stats");
    pub const UPDATE_BASE_STATS_TO_GENERATION: SettingId = SettingId::new("update_base_stats_to_generation");
    pub const STANDARDIZE_EXP_CURVES: SettingId = SettingId::new("standardize_exp_curves");
    pub const SELECTED_EXP_CURVE: SettingId = SettingId::new("selected_exp_curve");

    pub const TYPES_MOD: SettingId = SettingId::new("types_mod");

    pub const ABILITIES_MOD: SettingId = SettingId::new("abilities_mod");
    pub const ALLOW_WONDER_GUARD: SettingId = SettingId::new("allow_wonder_guard");
    pub const ABILITIES_FOLLOW_EVOLUTIONS: SettingId = SettingId::new("abilities_follow_evolutions");

    pub const EVOLUTIONS_MOD: SettingId = SettingId::new("evolutions_mod");
    pub const CHANGE_IMPOSSIBLE_EVOLUTIONS: SettingId = SettingId::new("change_impossible_evolutions");

    pub const STARTERS_MOD: SettingId = SettingId::new("starters_mod");
    pub const CUSTOM_STARTER_1: SettingId = SettingId::new("custom_starter_1");
    pub const CUSTOM_STARTER_2: SettingId = SettingId::new("custom_starter_2");
    pub const CUSTOM_STARTER_3: SettingId = SettingId::new("custom_starter_3");
    pub const RANDOM_STARTER_HELD_ITEMS: SettingId = SettingId::new("random_starter_held_items");

    pub const STATIC_POKEMON_MOD: SettingId = SettingId::new("static_pokemon_mod");
    pub const STATIC_LEVEL_MODIFIED: SettingId = SettingId::new("static_level_modified");
    pub const STATIC_LEVEL_MODIFIER: SettingId = SettingId::new("static_level_modifier");
    pub const TOTEM_LEVELS_MODIFIED: SettingId = SettingId::new("totem_levels_modified");
    pub const TOTEM_LEVEL_MODIFIER: SettingId = SettingId::new("totem_level_modifier");

    pub const UPDATE_MOVES: SettingId = SettingId::new("update_moves");
    pub const UPDATE_MOVES_TO_GENERATION: SettingId = SettingId::new("update_moves_to_generation");
    pub const RANDOMIZE_MOVE_POWERS: SettingId = SettingId::new("randomize_move_powers");
    pub const RANDOMIZE_MOVE_ACCURACIES: SettingId = SettingId::new("randomize_move_accuracies");
    pub const RANDOMIZE_MOVE_TYPES: SettingId = SettingId::new("randomize_move_types");
    pub const RANDOMIZE_MOVE_CATEGORIES: SettingId = SettingId::new("randomize_move_categories");

    pub const MOVESETS_MOD: SettingId = SettingId::new("movesets_mod");
    pub const START_WITH_GUARANTEED_MOVES: SettingId = SettingId::new("start_with_guaranteed_moves");
    pub const GUARANTEED_MOVE_COUNT: SettingId = SettingId::new("guaranteed_move_count");
    pub const MOVESETS_FORCE_GOOD_DAMAGING: SettingId = SettingId::new("movesets_force_good_damaging");
    pub const MOVESETS_GOOD_DAMAGING_PERCENT: SettingId = SettingId::new("movesets_good_damaging_percent");

    pub const TRAINERS_MOD: SettingId = SettingId::new("trainers_mod");
    pub const TRAINERS_FORCE_FULLY_EVOLVED: SettingId = SettingId::new("trainers_force_fully_evolved");
    pub const TRAINERS_FORCE_FULLY_EVOLVED_LEVEL: SettingId = SettingId::new("trainers_force_fully_evolved_level");
    pub const TRAINERS_LEVELS_MODIFIED: SettingId = SettingId::new("trainers_levels_modified");
    pub const TRAINERS_LEVEL_MODIFIER: SettingId = SettingId::new("trainers_level_modifier");
    pub const ADDITIONAL_BOSS_TRAINER_POKEMON: SettingId = SettingId::new("additional_boss_trainer_pokemon");
    pub const ADDITIONAL_IMPORTANT_TRAINER_POKEMON: SettingId =
        SettingId::new("additional_important_trainer_pokemon");
    pub const ADDITIONAL_REGULAR_TRAINER_POKEMON: SettingId = SettingId::new("additional_regular_trainer_pokemon");
    pub const ELITE_FOUR_UNIQUE_POKEMON_NUMBER: SettingId = SettingId::new("elite_four_unique_pokemon_number");

    pub const WILD_POKEMON_MOD: SettingId = SettingId::new("wild_pokemon_mod");
    pub const USE_MINIMUM_CATCH_RATE: SettingId = SettingId::new("use_minimum_catch_rate");
    pub const MINIMUM_CATCH_RATE_LEVEL: SettingId = SettingId::new("minimum_catch_rate_level");
    pub const WILD_LEVELS_MODIFIED: SettingId = SettingId::new("wild_levels_modified");
    pub const WILD_LEVEL_MODIFIER: SettingId = SettingId::new("wild_level_modifier");

    pub const TMS_MOD: SettingId = SettingId::new("tms_mod");
    pub const TMS_FORCE_GOOD_DAMAGING: SettingId = SettingId::new("tms_force_good_damaging");
    pub const TMS_GOOD_DAMAGING_PERCENT: SettingId = SettingId::new("tms_good_damaging_percent");
    pub const MOVE_TUTOR_MOVES_MOD: SettingId = SettingId::new("move_tutor_moves_mod");
    pub const TUTORS_FORCE_GOOD_DAMAGING: SettingId = SettingId::new("tutors_force_good_damaging");
    pub const TUTORS_GOOD_DAMAGING_PERCENT: SettingId = SettingId::new("tutors_good_damaging_percent");

    pub const FIELD_ITEMS_MOD: SettingId = SettingId::new("field_items_mod");
    pub const BAN_BAD_ITEMS: SettingId = SettingId::new("ban_bad_items");

    pub const MISC_TWEAKS: SettingId = SettingId::new("misc_tweaks");

    pub const LIMIT_POKEMON: SettingId = SettingId::new("limit_pokemon");
    pub const ALLOW_GEN_1: SettingId = SettingId::new("allow_gen_1");
    pub const ALLOW_GEN_2: SettingId = SettingId::new("allow_gen_2");
    pub const ALLOW_GEN_3: SettingId = SettingId::new("allow_gen_3");
    pub const ALLOW_GEN_4: SettingId = SettingId::new("allow_gen_4");
    pub const ALLOW_GEN_5: SettingId = SettingId::new("allow_gen_5");
    pub const ALLOW_GEN_6: SettingId = SettingId::new("allow_gen_6");
    pub const ALLOW_GEN_7: SettingId = SettingId::new("allow_gen_7");
    pub const ALLOW_GEN_8: SettingId = SettingId::new("allow_gen_8");
    pub const ALLOW_EVOLUTIONARY_RELATIVES: SettingId = SettingId::new("allow_evolutionary_relatives");
}

/// Experience curve variant names, classic curves first
pub const EXP_CURVES: &[&str] = &["medium_fast", "medium_slow", "fast", "slow", "erratic", "fluctuating"];

/// Custom starter slots in party order
pub const CUSTOM_STARTERS: [SettingId; 3] = [ids::CUSTOM_STARTER_1, ids::CUSTOM_STARTER_2, ids::CUSTOM_STARTER_3];

/// Per-generation allow flags, first generation first
pub const ALLOWED_GENERATIONS: [SettingId; HIGHEST_GENERATION as usize] = [
    ids::ALLOW_GEN_1,
    ids::ALLOW_GEN_2,
    ids::ALLOW_GEN_3,
    ids::ALLOW_GEN_4,
    ids::ALLOW_GEN_5,
    ids::ALLOW_GEN_6,
    ids::ALLOW_GEN_7,
    ids::ALLOW_GEN_8,
];

/// Largest entity number a custom starter slot can hold (`u16::MAX`)
pub const MAX_ENTITY_NUMBER: i32 = 0xFFFF;

const UNCHANGED_OR_RANDOM: &[&str] = &["unchanged", "random"];

use Category as C;
use SettingDescriptor as D;

/// The shipped settings table
pub static BUILTIN_SETTINGS: &[SettingDescriptor] = &[
    // Base statistics
    D::choice("base_statistics_mod", C::BaseStats, &["unchanged", "shuffle", "random"]),
    D::flag("base_stats_follow_evolutions", C::BaseStats, false),
    D::flag("update_base_stats", C::BaseStats, false).for_generations(1, HIGHEST_GENERATION - 1),
    D::range("update_base_stats_to_generation", C::BaseStats, 1, HIGHEST_GENERATION as i32, 6)
        .gated_by(ids::UPDATE_BASE_STATS)
        .derived(Derivation::BaseStatGenerations)
        .for_generations(1, HIGHEST_GENERATION - 1),
    D::flag("standardize_exp_curves", C::BaseStats, false),
    D::choice("selected_exp_curve", C::BaseStats, EXP_CURVES)
        .gated_by(ids::STANDARDIZE_EXP_CURVES)
        .derived(Derivation::ExpCurves),
    // Types
    D::choice(
        "types_mod",
        C::Types,
        &["unchanged", "random_follow_evolutions", "completely_random"],
    ),
    // Abilities
    D::choice("abilities_mod", C::Abilities, &["unchanged", "randomize"]).for_generations(3, HIGHEST_GENERATION),
    D::flag("allow_wonder_guard", C::Abilities, false).for_generations(3, HIGHEST_GENERATION),
    D::flag("abilities_follow_evolutions", C::Abilities, false).for_generations(3, HIGHEST_GENERATION),
    // Evolutions
    D::choice("evolutions_mod", C::Evolutions, &["unchanged", "random", "random_every_level"]),
    D::flag("change_impossible_evolutions", C::Evolutions, false),
    // Starters
    D::choice(
        "starters_mod",
        C::Starters,
        &["unchanged", "custom", "completely_random", "random_with_two_evolutions"],
    ),
    D::range("custom_starter_1", C::Starters, 0, MAX_ENTITY_NUMBER, 0),
    D::range("custom_starter_2", C::Starters, 0, MAX_ENTITY_NUMBER, 0),
    D::range("custom_starter_3", C::Starters, 0, MAX_ENTITY_NUMBER, 0),
    D::flag("random_starter_held_items", C::Starters, false).for_generations(2, HIGHEST_GENERATION),
    // Static encounters
    D::choice(
        "static_pokemon_mod",
        C::Statics,
        &["unchanged", "random_matching", "completely_random", "similar_strength"],
    ),
    D::flag("static_level_modified", C::Statics, false),
    D::range("static_level_modifier", C::Statics, -50, 50, 0).gated_by(ids::STATIC_LEVEL_MODIFIED),
    D::flag("totem_levels_modified", C::Statics, false).for_generations(7, 7),
    D::range("totem_level_modifier", C::Statics, -50, 50, 0)
        .gated_by(ids::TOTEM_LEVELS_MODIFIED)
        .for_generations(7, 7),
    // Move data
    D::flag("update_moves", C::Moves, false).for_generations(1, HIGHEST_GENERATION - 1),
    D::range("update_moves_to_generation", C::Moves, 2, HIGHEST_GENERATION as i32, HIGHEST_GENERATION as i32)
        .gated_by(ids::UPDATE_MOVES)
        .derived(Derivation::MoveGenerations)
        .for_generations(1, HIGHEST_GENERATION - 1),
    D::flag("randomize_move_powers", C::Moves, false),
    D::flag("randomize_move_accuracies", C::Moves, false),
    D::flag("randomize_move_types", C::Moves, false),
    D::flag("randomize_move_categories", C::Moves, false).for_generations(4, HIGHEST_GENERATION),
    // Movesets
    D::choice(
        "movesets_mod",
        C::Movesets,
        &["unchanged", "random_prefer_same_type", "completely_random", "metronome_only"],
    ),
    D::flag("start_with_guaranteed_moves", C::Movesets, false),
    D::range("guaranteed_move_count", C::Movesets, 2, 4, 2).gated_by(ids::START_WITH_GUARANTEED_MOVES),
    D::flag("movesets_force_good_damaging", C::Movesets, false),
    D::range("movesets_good_damaging_percent", C::Movesets, 0, 100, 0).gated_by(ids::MOVESETS_FORCE_GOOD_DAMAGING),
    // Trainers
    D::choice(
        "trainers_mod",
        C::Trainers,
        &[
            "unchanged",
            "random",
            "distributed",
            "main_playthrough",
            "type_themed",
            "type_themed_elite4_gyms",
        ],
    ),
    D::flag("trainers_force_fully_evolved", C::Trainers, false),
    D::range("trainers_force_fully_evolved_level", C::Trainers, 30, 65, 30)
        .gated_by(ids::TRAINERS_FORCE_FULLY_EVOLVED),
    D::flag("trainers_levels_modified", C::Trainers, false),
    D::range("trainers_level_modifier", C::Trainers, -50, 50, 0).gated_by(ids::TRAINERS_LEVELS_MODIFIED),
    D::range("additional_boss_trainer_pokemon", C::Trainers, 0, 5, 0).active_when_nonzero(),
    D::range("additional_important_trainer_pokemon", C::Trainers, 0, 5, 0).active_when_nonzero(),
    D::range("additional_regular_trainer_pokemon", C::Trainers, 0, 5, 0).active_when_nonzero(),
    D::range("elite_four_unique_pokemon_number", C::Trainers, 0, 2, 0).active_when_nonzero(),
    // Wild encounters
    D::choice(
        "wild_pokemon_mod",
        C::Wild,
        &["unchanged", "random", "area_mapping", "global_mapping"],
    ),
    D::flag("use_minimum_catch_rate", C::Wild, false),
    D::range("minimum_catch_rate_level", C::Wild, 1, 4, 1).gated_by(ids::USE_MINIMUM_CATCH_RATE),
    D::flag("wild_levels_modified", C::Wild, false),
    D::range("wild_level_modifier", C::Wild, -50, 50, 0).gated_by(ids::WILD_LEVELS_MODIFIED),
    // TMs and tutors
    D::choice("tms_mod", C::TmsTutors, UNCHANGED_OR_RANDOM),
    D::flag("tms_force_good_damaging", C::TmsTutors, false),
    D::range("tms_good_damaging_percent", C::TmsTutors, 0, 100, 0).gated_by(ids::TMS_FORCE_GOOD_DAMAGING),
    D::choice("move_tutor_moves_mod", C::TmsTutors, UNCHANGED_OR_RANDOM).for_generations(2, HIGHEST_GENERATION),
    D::flag("tutors_force_good_damaging", C::TmsTutors, false).for_generations(2, HIGHEST_GENERATION),
    D::range("tutors_good_damaging_percent", C::TmsTutors, 0, 100, 0)
        .gated_by(ids::TUTORS_FORCE_GOOD_DAMAGING)
        .for_generations(2, HIGHEST_GENERATION),
    // Field items
    D::choice(
        "field_items_mod",
        C::Items,
        &["unchanged", "shuffle", "random", "random_even"],
    ),
    D::flag("ban_bad_items", C::Items, false),
    // Misc
    D::range("misc_tweaks", C::Misc, 0, ALL_TWEAKS_MASK, 0),
    // Generation restrictions; an artifact only holds entities up to its own generation
    D::flag("limit_pokemon", C::Restrictions, false),
    D::flag("allow_gen_1", C::Restrictions, false).gated_by(ids::LIMIT_POKEMON),
    D::flag("allow_gen_2", C::Restrictions, false)
        .gated_by(ids::LIMIT_POKEMON)
        .for_generations(2, HIGHEST_GENERATION),
    D::flag("allow_gen_3", C::Restrictions, false)
        .gated_by(ids::LIMIT_POKEMON)
        .for_generations(3, HIGHEST_GENERATION),
    D::flag("allow_gen_4", C::Restrictions, false)
        .gated_by(ids::LIMIT_POKEMON)
        .for_generations(4, HIGHEST_GENERATION),
    D::flag("allow_gen_5", C::Restrictions, false)
        .gated_by(ids::LIMIT_POKEMON)
        .for_generations(5, HIGHEST_GENERATION),
    D::flag("allow_gen_6", C::Restrictions, false)
        .gated_by(ids::LIMIT_POKEMON)
        .for_generations(6, HIGHEST_GENERATION),
    D::flag("allow_gen_7", C::Restrictions, false)
        .gated_by(ids::LIMIT_POKEMON)
        .for_generations(7, HIGHEST_GENERATION),
    D::flag("allow_gen_8", C::Restrictions, false)
        .gated_by(ids::LIMIT_POKEMON)
        .for_generations(8, HIGHEST_GENERATION),
    D::flag("allow_evolutionary_relatives", C::Restrictions, false).gated_by(ids::LIMIT_POKEMON),
];

/// Indexed, immutable settings table
#[derive(Debug, Clone)]
pub struct Schema {
    table: &'static [SettingDescriptor],
    by_id: HashMap<SettingId, usize>,
}

impl Schema {
    /// Build from a table, rejecting inconsistent tables
    ///
    /// # Errors
    /// Returns [`SchemaError`] for duplicate ids, dangling or non-boolean
    /// gates, empty domains, out-of-domain defaults and misplaced derivations.
    pub fn from_table(table: &'static [SettingDescriptor]) -> Result<Self, SchemaError> {
        let schema = Self::index(table);
        schema.validate()?;
        Ok(schema)
    }

    /// The shipped table
    ///
    /// The table is checked by the crate's tests, so no validation is
    /// repeated here.
    #[must_use]
    pub fn builtin() -> Self {
        Self::index(BUILTIN_SETTINGS)
    }

    fn index(table: &'static [SettingDescriptor]) -> Self {
        let by_id = table
            .iter()
            .enumerate()
            .map(|(i, desc)| (desc.id, i))
            .collect();
        Self { table, by_id }
    }

    /// Check table consistency
    ///
    /// # Errors
    /// See [`Schema::from_table`].
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for desc in self.table {
            if !seen.insert(desc.id) {
                return Err(SchemaError::DuplicateId(desc.id));
            }

            match desc.kind {
                SettingKind::IntegerRange { min, max } if min > max => {
                    return Err(SchemaError::EmptyDomain(desc.id));
                }
                SettingKind::Enumeration { variants } if variants.is_empty() => {
                    return Err(SchemaError::EmptyDomain(desc.id));
                }
                _ => {}
            }

            if !desc.kind.contains(&desc.default) {
                return Err(SchemaError::InvalidDefault(desc.id));
            }

            if let Some(Toggle::Gate(gate)) = desc.toggle {
                match self.get(gate) {
                    None => {
                        return Err(SchemaError::UnknownGate {
                            setting: desc.id,
                            gate,
                        })
                    }
                    Some(g) if g.kind != SettingKind::Boolean => {
                        return Err(SchemaError::GateNotBoolean {
                            setting: desc.id,
                            gate,
                        })
                    }
                    Some(_) => {}
                }
            }

            if desc.derivation.is_some() && desc.kind == SettingKind::Boolean {
                return Err(SchemaError::InvalidDerivation(desc.id));
            }
        }
        Ok(())
    }

    /// Every descriptor in table order
    #[inline]
    #[must_use]
    pub fn describe(&self) -> &'static [SettingDescriptor] {
        self.table
    }

    /// Descriptor by identifier
    #[inline]
    #[must_use]
    pub fn get(&self, id: SettingId) -> Option<&'static SettingDescriptor> {
        self.find(id.as_str())
    }

    /// Descriptor by identifier text (codec tags, user input)
    #[inline]
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&'static SettingDescriptor> {
        let table = self.table;
        self.by_id.get(tag).map(|&i| &table[i])
    }

    /// Number of settings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Descriptors of one category
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &'static SettingDescriptor> {
        self.table.iter().filter(move |d| d.category == category)
    }

    /// Descriptors supported by an artifact generation
    pub fn supported(&self, generation: u8) -> impl Iterator<Item = &'static SettingDescriptor> {
        self.table.iter().filter(move |d| d.supports(generation))
    }

    /// Descriptors carrying a derived option set
    pub fn derived(&self) -> impl Iterator<Item = (&'static SettingDescriptor, Derivation)> {
        self.table
            .iter()
            .filter_map(|d| d.derivation.map(|derivation| (d, derivation)))
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::builtin()
    }
}
