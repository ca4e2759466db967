//! Generation-dependent option sets
//!
//! Some settings only offer a subset of their declared domain, and which
//! subset depends on the loaded artifact's generation. The sets are
//! recomputed from scratch on every artifact load; an empty set means the
//! feature is unavailable for that artifact.

use std::collections::BTreeMap;

use crate::schema::{Derivation, Schema, SettingId, EXP_CURVES};
use crate::value::SettingValue;

/// Highest artifact generation this build knows about
pub const HIGHEST_GENERATION: u8 = 8;

/// Base-stat data is only published from this generation on
const FIRST_BASE_STAT_TARGET: u8 = 6;

/// At most this many base-stat targets are offered
const MAX_BASE_STAT_TARGETS: usize = 3;

/// Curves that existed before generation 3
const CLASSIC_EXP_CURVES: usize = 4;

/// Target generations for "update base stats"
///
/// Starts at `max(6, generation + 1)` and offers at most
/// `min(3, highest - generation)` consecutive generations, never above
/// `highest`.
#[must_use]
pub fn base_stat_generations(generation: u8, highest: u8) -> Vec<i32> {
    let count = usize::from(highest.saturating_sub(generation)).min(MAX_BASE_STAT_TARGETS);
    let start = FIRST_BASE_STAT_TARGET.max(generation.saturating_add(1));
    (start..=highest).take(count).map(i32::from).collect()
}

/// Target generations for "update moves": every generation after `generation`
#[must_use]
pub fn move_generations(generation: u8, highest: u8) -> Vec<i32> {
    (generation.saturating_add(1)..=highest).map(i32::from).collect()
}

/// Experience curves an artifact of `generation` can use
#[must_use]
pub fn exp_curves(generation: u8) -> &'static [&'static str] {
    if generation < 3 {
        &EXP_CURVES[..CLASSIC_EXP_CURVES]
    } else {
        EXP_CURVES
    }
}

/// Candidate values of one derivation
#[must_use]
pub fn candidates(derivation: Derivation, generation: u8, highest: u8) -> Vec<SettingValue> {
    match derivation {
        Derivation::BaseStatGenerations => base_stat_generations(generation, highest)
            .into_iter()
            .map(SettingValue::Int)
            .collect(),
        Derivation::MoveGenerations => move_generations(generation, highest)
            .into_iter()
            .map(SettingValue::Int)
            .collect(),
        Derivation::ExpCurves => exp_curves(generation).iter().copied().map(SettingValue::Variant).collect(),
    }
}

/// Derived option sets for the loaded artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedOptions {
    generation: Option<u8>,
    sets: BTreeMap<SettingId, Vec<SettingValue>>,
}

impl DerivedOptions {
    /// No artifact loaded: nothing restricted
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute every derived set of a schema for one generation
    #[must_use]
    pub fn compute(schema: &Schema, generation: u8, highest: u8) -> Self {
        let sets = schema
            .derived()
            .map(|(desc, derivation)| (desc.id, candidates(derivation, generation, highest)))
            .collect();
        Self {
            generation: Some(generation),
            sets,
        }
    }

    /// Generation the sets were computed for
    #[inline]
    #[must_use]
    pub fn generation(&self) -> Option<u8> {
        self.generation
    }

    /// Offered values of a derived setting
    ///
    /// `None` when the setting has no derivation or nothing was computed yet.
    #[inline]
    #[must_use]
    pub fn options(&self, id: SettingId) -> Option<&[SettingValue]> {
        self.sets.get(&id).map(Vec::as_slice)
    }

    /// Check whether a derived setting is usable with the loaded artifact
    #[inline]
    #[must_use]
    pub fn is_available(&self, id: SettingId) -> bool {
        self.options(id).map_or(true, |opts| !opts.is_empty())
    }

    /// Check whether a value is offered (unrestricted settings accept anything)
    #[inline]
    #[must_use]
    pub fn offers(&self, id: SettingId, value: &SettingValue) -> bool {
        match self.options(id) {
            Some(opts) if !opts.is_empty() => opts.contains(value),
            _ => true,
        }
    }

    /// Iterate computed sets
    pub fn iter(&self) -> impl Iterator<Item = (SettingId, &[SettingValue])> {
        self.sets.iter().map(|(id, opts)| (*id, opts.as_slice()))
    }
}
