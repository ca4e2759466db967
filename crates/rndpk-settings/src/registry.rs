//! Live settings registry
//!
//! The registry owns the current value of every setting in a [`Schema`] and
//! routes every mutation through the constraint engine:
//! - kind and variant checks
//! - range clamps
//! - derived option sets of the loaded artifact
//!
//! Gated settings keep their stored value when their gate is off; they are
//! only left out of [`SettingsRegistry::active_snapshot`].

use std::collections::BTreeMap;

use crate::constraint::{clamp, clamp_raw, is_enabled};
use crate::derived::DerivedOptions;
use crate::error::SettingsError;
use crate::names::CustomNames;
use crate::restrictions::GenRestrictions;
use crate::schema::{
    ids, Schema, SettingDescriptor, SettingId, SettingKind, Toggle, ALLOWED_GENERATIONS, CUSTOM_STARTERS,
};
use crate::tweaks::MiscTweak;
use crate::value::{SettingValue, Snapshot};

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Current values of every setting in a schema
#[derive(Debug, Clone)]
pub struct SettingsRegistry {
    schema: Schema,
    values: BTreeMap<SettingId, SettingValue>,
    derived: DerivedOptions,
    rom_name: Option<String>,
    custom_names: CustomNames,
}

impl SettingsRegistry {
    /// Create registry holding every default of `schema`
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        let values = schema.describe().iter().map(|d| (d.id, d.default)).collect();
        Self {
            schema,
            values,
            derived: DerivedOptions::new(),
            rom_name: None,
            custom_names: CustomNames::new(),
        }
    }

    /// Registry over the shipped table
    #[must_use]
    pub fn with_builtin() -> Self {
        Self::new(Schema::builtin())
    }

    /// Schema backing the registry
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Every descriptor in table order
    #[inline]
    #[must_use]
    pub fn describe(&self) -> &'static [SettingDescriptor] {
        self.schema.describe()
    }

    fn descriptor(&self, id: SettingId) -> Result<&'static SettingDescriptor> {
        self.schema
            .get(id)
            .ok_or_else(|| SettingsError::UnknownSetting(id.to_string()))
    }

    /// Current value of a setting
    ///
    /// # Errors
    /// Returns [`SettingsError::UnknownSetting`] for ids outside the schema.
    pub fn get(&self, id: SettingId) -> Result<SettingValue> {
        self.values
            .get(&id)
            .copied()
            .ok_or_else(|| SettingsError::UnknownSetting(id.to_string()))
    }

    /// Current value of a boolean setting
    ///
    /// # Errors
    /// Unknown ids and non-boolean settings are rejected.
    pub fn bool(&self, id: SettingId) -> Result<bool> {
        let value = self.get(id)?;
        value.as_bool().ok_or(SettingsError::TypeMismatch {
            id,
            expected: "boolean",
            actual: value.kind_name(),
        })
    }

    /// Current value of an integer setting
    ///
    /// # Errors
    /// Unknown ids and non-integer settings are rejected.
    pub fn int(&self, id: SettingId) -> Result<i32> {
        let value = self.get(id)?;
        value.as_int().ok_or(SettingsError::TypeMismatch {
            id,
            expected: "integer",
            actual: value.kind_name(),
        })
    }

    /// Check a candidate value and return what would be stored
    ///
    /// Integers are clamped into range; the result must also be offered by
    /// the setting's derived option set when that set is non-empty.
    ///
    /// # Errors
    /// `UnknownSetting`, `TypeMismatch`, `UnknownVariant` or `NotOffered`.
    pub fn validate(&self, id: SettingId, value: SettingValue) -> Result<SettingValue> {
        let desc = self.descriptor(id)?;
        if !desc.kind.matches(&value) {
            return Err(SettingsError::TypeMismatch {
                id,
                expected: desc.kind.name(),
                actual: value.kind_name(),
            });
        }
        if let (SettingKind::Enumeration { .. }, SettingValue::Variant(v)) = (desc.kind, value) {
            if !desc.kind.contains(&value) {
                return Err(SettingsError::UnknownVariant {
                    id,
                    value: v.to_string(),
                });
            }
        }

        let value = clamp(&desc.kind, value);
        if !self.derived.offers(id, &value) {
            return Err(SettingsError::NotOffered {
                id,
                value: value.to_string(),
            });
        }
        Ok(value)
    }

    /// Store a value, returning the value actually stored
    ///
    /// # Errors
    /// See [`SettingsRegistry::validate`]. A rejected value leaves the
    /// registry unchanged.
    pub fn set(&mut self, id: SettingId, value: SettingValue) -> Result<SettingValue> {
        let stored = self.validate(id, value)?;
        self.values.insert(id, stored);
        tracing::debug!("Setting {} = {}", id, stored);
        Ok(stored)
    }

    /// Store a wide raw integer, clamped into the setting's range
    ///
    /// # Errors
    /// Non-integer settings are a `TypeMismatch`.
    pub fn set_int_raw(&mut self, id: SettingId, raw: i64) -> Result<SettingValue> {
        let desc = self.descriptor(id)?;
        let clamped = clamp_raw(&desc.kind, raw).ok_or(SettingsError::TypeMismatch {
            id,
            expected: desc.kind.name(),
            actual: "integer",
        })?;
        self.set(id, SettingValue::Int(clamped))
    }

    /// Store an enumeration variant by name
    ///
    /// # Errors
    /// Unknown names are an `UnknownVariant`.
    pub fn set_variant(&mut self, id: SettingId, name: &str) -> Result<SettingValue> {
        let desc = self.descriptor(id)?;
        let variant = match desc.kind {
            SettingKind::Enumeration { .. } => desc.kind.variant(name).ok_or_else(|| SettingsError::UnknownVariant {
                id,
                value: name.to_string(),
            })?,
            kind => {
                return Err(SettingsError::TypeMismatch {
                    id,
                    expected: kind.name(),
                    actual: "variant",
                })
            }
        };
        self.set(id, SettingValue::Variant(variant))
    }

    /// Flip the boolean gate of a controlled setting
    ///
    /// The controlled value itself is never touched.
    ///
    /// # Errors
    /// Settings without an explicit gate fail with `NotGated`.
    pub fn set_enabled(&mut self, id: SettingId, enabled: bool) -> Result<()> {
        match self.descriptor(id)?.toggle {
            Some(Toggle::Gate(gate)) => {
                self.set(gate, SettingValue::Bool(enabled))?;
                Ok(())
            }
            _ => Err(SettingsError::NotGated(id)),
        }
    }

    /// Check whether a setting currently applies
    ///
    /// A setting is inert when its toggle resolves to disabled, when its
    /// derived option set is empty for the loaded artifact, or when it gates
    /// a setting whose derived option set is empty.
    #[must_use]
    pub fn is_active(&self, id: SettingId) -> bool {
        let (Some(desc), Some(value)) = (self.schema.get(id), self.values.get(&id).copied()) else {
            return false;
        };
        if !self.derived.is_available(id) {
            return false;
        }
        let gates_unavailable = self
            .schema
            .describe()
            .iter()
            .any(|d| d.toggle == Some(Toggle::Gate(id)) && !self.derived.is_available(d.id));
        if gates_unavailable {
            return false;
        }
        is_enabled(desc, value, |gate| self.values.get(&gate).copied())
    }

    /// Copy of every stored value, active or not
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.values.iter().map(|(id, v)| (*id, *v)).collect()
    }

    /// Copy of the values that currently apply
    #[must_use]
    pub fn active_snapshot(&self) -> Snapshot {
        self.values
            .iter()
            .filter(|(id, _)| self.is_active(**id))
            .map(|(id, v)| (*id, *v))
            .collect()
    }

    /// Recompute derived option sets for a newly loaded artifact
    ///
    /// Stored values no longer offered are reset to the first candidate; a
    /// value the new artifact still offers is kept rather than reset.
    pub fn refresh_derived(&mut self, generation: u8, highest: u8) {
        self.derived = DerivedOptions::compute(&self.schema, generation, highest);
        for (id, opts) in self.derived.iter() {
            let Some(first) = opts.first().copied() else {
                tracing::debug!("{} unavailable for generation {}", id, generation);
                continue;
            };
            let offered = self.values.get(&id).is_some_and(|v| opts.contains(v));
            if !offered {
                tracing::debug!("Resetting {} to {} for generation {}", id, first, generation);
                self.values.insert(id, first);
            }
        }
    }

    /// Derived option sets of the loaded artifact
    #[inline]
    #[must_use]
    pub fn derived(&self) -> &DerivedOptions {
        &self.derived
    }

    /// Offered values of a derived setting
    #[inline]
    #[must_use]
    pub fn options(&self, id: SettingId) -> Option<&[SettingValue]> {
        self.derived.options(id)
    }

    /// Apply a decoded snapshot
    ///
    /// Every value is validated before any is written. Values of derived
    /// settings that the loaded artifact does not offer keep the current
    /// value. Returns the number of values written.
    ///
    /// # Errors
    /// The first rejected value aborts the merge with the registry unchanged.
    pub fn merge(&mut self, snapshot: &Snapshot) -> Result<usize> {
        let mut staged = Vec::with_capacity(snapshot.len());
        for (id, value) in snapshot.iter() {
            match self.validate(id, value) {
                Ok(stored) => staged.push((id, stored)),
                Err(SettingsError::NotOffered { id, value }) => {
                    tracing::warn!("Keeping current {}: {} not offered for the loaded artifact", id, value);
                }
                Err(e) => return Err(e),
            }
        }

        let written = staged.len();
        self.values.extend(staged);
        tracing::info!("Merged {} of {} settings", written, snapshot.len());
        Ok(written)
    }

    /// Flip one misc tweak bit, returning whether it is now set
    ///
    /// # Errors
    /// Fails only if the schema lacks the tweak mask setting.
    pub fn toggle_misc_tweak(&mut self, tweak: &MiscTweak) -> Result<bool> {
        let mask = self.int(ids::MISC_TWEAKS)? ^ tweak.value;
        self.set(ids::MISC_TWEAKS, SettingValue::Int(mask))?;
        Ok(tweak.is_set(mask))
    }

    /// Check whether a misc tweak bit is set
    #[must_use]
    pub fn misc_tweak_enabled(&self, tweak: &MiscTweak) -> bool {
        self.int(ids::MISC_TWEAKS).is_ok_and(|mask| tweak.is_set(mask))
    }

    /// Store the three custom starter entity numbers
    ///
    /// Entity numbers are identities, so they are range-checked instead of
    /// clamped.
    ///
    /// # Errors
    /// `OutOfRange` for a number the slot cannot hold. All three are
    /// validated before any is written.
    pub fn set_custom_starters(&mut self, numbers: [i32; 3]) -> Result<()> {
        let staged = CUSTOM_STARTERS
            .iter()
            .zip(numbers)
            .map(|(id, n)| self.check_in_range(*id, n).map(|v| (*id, v)))
            .collect::<Result<Vec<_>>>()?;
        self.values.extend(staged);
        Ok(())
    }

    fn check_in_range(&self, id: SettingId, value: i32) -> Result<SettingValue> {
        if let SettingKind::IntegerRange { min, max } = self.descriptor(id)?.kind {
            if !(min..=max).contains(&value) {
                return Err(SettingsError::OutOfRange {
                    id,
                    value: i64::from(value),
                    min,
                    max,
                });
            }
        }
        self.validate(id, SettingValue::Int(value))
    }

    /// Custom starter entity numbers in party order
    #[must_use]
    pub fn custom_starters(&self) -> [i32; 3] {
        CUSTOM_STARTERS.map(|id| self.int(id).unwrap_or(0))
    }

    /// Name of the artifact the settings were made for
    #[inline]
    #[must_use]
    pub fn rom_name(&self) -> Option<&str> {
        self.rom_name.as_deref()
    }

    /// Record the artifact name
    pub fn set_rom_name(&mut self, name: Option<String>) {
        self.rom_name = name;
    }

    /// Generation restrictions, or `None` while `limit_pokemon` is off
    #[must_use]
    pub fn gen_restrictions(&self) -> Option<GenRestrictions> {
        if !self.bool(ids::LIMIT_POKEMON).unwrap_or(false) {
            return None;
        }
        let restrictions = (1..)
            .zip(ALLOWED_GENERATIONS)
            .filter(|(_, id)| self.bool(*id).unwrap_or(false))
            .fold(GenRestrictions::new(), |r, (generation, _)| r.with_generation(generation));
        Some(restrictions.with_relatives(self.bool(ids::ALLOW_EVOLUTIONARY_RELATIVES).unwrap_or(false)))
    }

    /// Store generation restrictions; `None` turns `limit_pokemon` off
    ///
    /// Turning restrictions off keeps the stored allow flags.
    ///
    /// # Errors
    /// Fails only if the schema lacks the restriction settings.
    pub fn set_gen_restrictions(&mut self, restrictions: Option<&GenRestrictions>) -> Result<()> {
        let Some(r) = restrictions else {
            self.set(ids::LIMIT_POKEMON, SettingValue::Bool(false))?;
            return Ok(());
        };
        let mut staged = vec![
            (ids::LIMIT_POKEMON, SettingValue::Bool(true)),
            (ids::ALLOW_EVOLUTIONARY_RELATIVES, SettingValue::Bool(r.allows_relatives())),
        ];
        staged.extend(
            (1..)
                .zip(ALLOWED_GENERATIONS)
                .map(|(generation, id)| (id, SettingValue::Bool(r.allows(generation)))),
        );
        for (id, value) in &staged {
            self.validate(*id, *value)?;
        }
        self.values.extend(staged);
        tracing::debug!("Generation restrictions set to {:?}", r);
        Ok(())
    }

    /// Custom name lists
    #[inline]
    #[must_use]
    pub fn custom_names(&self) -> &CustomNames {
        &self.custom_names
    }

    /// Custom name lists, for editing
    #[inline]
    pub fn custom_names_mut(&mut self) -> &mut CustomNames {
        &mut self.custom_names
    }

    /// Replace the custom name lists
    pub fn set_custom_names(&mut self, names: CustomNames) {
        self.custom_names = names;
    }
}

impl Default for SettingsRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::HIGHEST_GENERATION;

    #[test]
    fn new_holds_defaults() {
        let reg = SettingsRegistry::with_builtin();

        assert_eq!(reg.snapshot().len(), reg.schema().len());
        assert_eq!(reg.int(ids::GUARANTEED_MOVE_COUNT).unwrap(), 2);
        assert_eq!(reg.get(ids::TYPES_MOD).unwrap(), SettingValue::Variant("unchanged"));
    }

    #[test]
    fn set_clamps_ranges() {
        let mut reg = SettingsRegistry::with_builtin();

        let stored = reg.set(ids::WILD_LEVEL_MODIFIER, SettingValue::Int(80)).unwrap();
        assert_eq!(stored, SettingValue::Int(50));
        assert_eq!(reg.set_int_raw(ids::GUARANTEED_MOVE_COUNT, -9_000_000_000).unwrap(), SettingValue::Int(2));
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let mut reg = SettingsRegistry::with_builtin();
        let err = reg.set(ids::UPDATE_MOVES, SettingValue::Int(1)).unwrap_err();

        assert!(matches!(err, SettingsError::TypeMismatch { .. }));
        assert!(!reg.bool(ids::UPDATE_MOVES).unwrap());
    }

    #[test]
    fn set_variant_by_name() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.set_variant(ids::TYPES_MOD, "completely_random").unwrap();

        assert_eq!(reg.get(ids::TYPES_MOD).unwrap(), SettingValue::Variant("completely_random"));
        assert!(matches!(
            reg.set_variant(ids::TYPES_MOD, "sideways"),
            Err(SettingsError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn unknown_setting_is_rejected() {
        let reg = SettingsRegistry::with_builtin();
        let err = reg.get(SettingId::new("warp_speed")).unwrap_err();
        assert_eq!(err, SettingsError::UnknownSetting("warp_speed".to_string()));
    }

    #[test]
    fn disabling_gate_keeps_value_but_hides_it() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.set_enabled(ids::WILD_LEVEL_MODIFIER, true).unwrap();
        reg.set(ids::WILD_LEVEL_MODIFIER, SettingValue::Int(20)).unwrap();
        assert!(reg.active_snapshot().contains(ids::WILD_LEVEL_MODIFIER));

        reg.set_enabled(ids::WILD_LEVEL_MODIFIER, false).unwrap();

        assert_eq!(reg.int(ids::WILD_LEVEL_MODIFIER).unwrap(), 20);
        assert!(!reg.active_snapshot().contains(ids::WILD_LEVEL_MODIFIER));
        assert_eq!(reg.snapshot().get_int(ids::WILD_LEVEL_MODIFIER), Some(20));
    }

    #[test]
    fn ungated_setting_cannot_be_toggled() {
        let mut reg = SettingsRegistry::with_builtin();
        assert_eq!(
            reg.set_enabled(ids::ADDITIONAL_BOSS_TRAINER_POKEMON, true),
            Err(SettingsError::NotGated(ids::ADDITIONAL_BOSS_TRAINER_POKEMON))
        );
    }

    #[test]
    fn nonzero_settings_are_active_when_set() {
        let mut reg = SettingsRegistry::with_builtin();
        assert!(!reg.is_active(ids::ADDITIONAL_BOSS_TRAINER_POKEMON));

        reg.set(ids::ADDITIONAL_BOSS_TRAINER_POKEMON, SettingValue::Int(3)).unwrap();
        assert!(reg.is_active(ids::ADDITIONAL_BOSS_TRAINER_POKEMON));
    }

    #[test]
    fn refresh_resets_values_not_offered() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.set(ids::UPDATE_MOVES_TO_GENERATION, SettingValue::Int(3)).unwrap();

        reg.refresh_derived(7, HIGHEST_GENERATION);

        assert_eq!(reg.int(ids::UPDATE_MOVES_TO_GENERATION).unwrap(), 8);
        assert_eq!(reg.options(ids::UPDATE_MOVES_TO_GENERATION), Some(&[SettingValue::Int(8)][..]));
        assert!(matches!(
            reg.set(ids::UPDATE_MOVES_TO_GENERATION, SettingValue::Int(5)),
            Err(SettingsError::NotOffered { .. })
        ));
    }

    #[test]
    fn refresh_keeps_values_still_offered() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.refresh_derived(1, HIGHEST_GENERATION);
        reg.set(ids::UPDATE_BASE_STATS_TO_GENERATION, SettingValue::Int(7)).unwrap();

        reg.refresh_derived(6, HIGHEST_GENERATION);
        assert_eq!(reg.int(ids::UPDATE_BASE_STATS_TO_GENERATION).unwrap(), 7);

        reg.refresh_derived(7, HIGHEST_GENERATION);
        assert_eq!(reg.int(ids::UPDATE_BASE_STATS_TO_GENERATION).unwrap(), 8);
    }

    #[test]
    fn empty_derived_set_makes_feature_inert() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.set(ids::UPDATE_BASE_STATS, SettingValue::Bool(true)).unwrap();

        reg.refresh_derived(HIGHEST_GENERATION, HIGHEST_GENERATION);

        let active = reg.active_snapshot();
        assert!(!active.contains(ids::UPDATE_BASE_STATS_TO_GENERATION));
        assert!(!active.contains(ids::UPDATE_BASE_STATS));
        assert!(reg.bool(ids::UPDATE_BASE_STATS).unwrap());
    }

    #[test]
    fn merge_is_atomic() {
        let mut reg = SettingsRegistry::with_builtin();
        let mut snap = Snapshot::new();
        snap.insert(ids::WILD_LEVEL_MODIFIER, SettingValue::Int(10));
        snap.insert(ids::UPDATE_MOVES, SettingValue::Variant("yes"));

        assert!(reg.merge(&snap).is_err());
        assert_eq!(reg.int(ids::WILD_LEVEL_MODIFIER).unwrap(), 0);
    }

    #[test]
    fn merge_keeps_values_not_offered() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.refresh_derived(7, HIGHEST_GENERATION);
        let mut snap = Snapshot::new();
        snap.insert(ids::UPDATE_MOVES_TO_GENERATION, SettingValue::Int(4));
        snap.insert(ids::TMS_MOD, SettingValue::Variant("random"));

        assert_eq!(reg.merge(&snap).unwrap(), 1);
        assert_eq!(reg.int(ids::UPDATE_MOVES_TO_GENERATION).unwrap(), 8);
        assert_eq!(reg.get(ids::TMS_MOD).unwrap(), SettingValue::Variant("random"));
    }

    #[test]
    fn gen_restrictions_follow_limit_gate() {
        let mut reg = SettingsRegistry::with_builtin();
        assert_eq!(reg.gen_restrictions(), None);

        let wanted = GenRestrictions::new().with_generation(1).with_generation(2).with_relatives(true);
        reg.set_gen_restrictions(Some(&wanted)).unwrap();
        assert_eq!(reg.gen_restrictions(), Some(wanted));
        assert!(reg.active_snapshot().get_bool(ids::ALLOW_GEN_2).unwrap());

        reg.set_gen_restrictions(None).unwrap();
        assert_eq!(reg.gen_restrictions(), None);
        assert!(!reg.active_snapshot().contains(ids::ALLOW_GEN_1));
        assert!(reg.bool(ids::ALLOW_GEN_1).unwrap());
    }

    #[test]
    fn custom_names_are_carried() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.custom_names_mut()
            .list_mut(crate::names::NameList::TrainerNames)
            .push("Ash".to_string());

        assert_eq!(reg.custom_names().len(), 1);
        reg.set_custom_names(CustomNames::new());
        assert!(reg.custom_names().is_empty());
    }

    #[test]
    fn misc_tweak_toggles_bit() {
        let mut reg = SettingsRegistry::with_builtin();
        let tweak = MiscTweak::by_name("fastest_text").unwrap();

        assert!(reg.toggle_misc_tweak(tweak).unwrap());
        assert!(reg.misc_tweak_enabled(tweak));
        assert!(!reg.toggle_misc_tweak(tweak).unwrap());
        assert_eq!(reg.int(ids::MISC_TWEAKS).unwrap(), 0);
    }

    #[test]
    fn custom_starters_round_trip() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.set_custom_starters([1, 4, 7]).unwrap();
        assert_eq!(reg.custom_starters(), [1, 4, 7]);
    }

    #[test]
    fn custom_starters_are_range_checked_not_clamped() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.set_custom_starters([1, 4, 7]).unwrap();

        reg.set_custom_starters([1024, 4000, 65535]).unwrap();
        assert_eq!(reg.custom_starters(), [1024, 4000, 65535]);

        let err = reg.set_custom_starters([1, 70_000, 7]).unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { value: 70_000, .. }));
        assert!(reg.set_custom_starters([-1, 4, 7]).is_err());
        assert_eq!(reg.custom_starters(), [1024, 4000, 65535]);
    }
}
