//! Range clamps and toggle resolution
//!
//! Both functions are total: a clamp never fails and a toggle always
//! resolves to enabled or disabled.

use crate::schema::{SettingDescriptor, SettingId, SettingKind, Toggle};
use crate::value::SettingValue;

/// Clamp a value into the setting's domain
///
/// Integers are pulled into `[min, max]`; booleans and variants are returned
/// unchanged because their domain is already closed. A value of the wrong
/// kind is returned unchanged as well; kind checks belong to the registry.
#[must_use]
pub fn clamp(kind: &SettingKind, value: SettingValue) -> SettingValue {
    match (kind, value) {
        (SettingKind::IntegerRange { min, max }, SettingValue::Int(raw)) => SettingValue::Int(raw.clamp(*min, *max)),
        (_, value) => value,
    }
}

/// Clamp a wide raw integer (slider position, parsed text) into a range
#[must_use]
pub fn clamp_raw(kind: &SettingKind, raw: i64) -> Option<i32> {
    match kind {
        SettingKind::IntegerRange { min, max } => {
            let clamped = raw.clamp(i64::from(*min), i64::from(*max));
            i32::try_from(clamped).ok()
        }
        _ => None,
    }
}

/// Resolve whether a setting's stored value applies
///
/// `lookup` reads the current value of another setting (the gate).
pub fn is_enabled<F>(desc: &SettingDescriptor, value: SettingValue, lookup: F) -> bool
where
    F: Fn(SettingId) -> Option<SettingValue>,
{
    match desc.toggle {
        None => true,
        Some(Toggle::Gate(gate)) => lookup(gate).and_then(|v| v.as_bool()).unwrap_or(false),
        // Negative values count as enabled
        Some(Toggle::NonZero) => value != SettingValue::Int(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ids, Schema};

    #[test]
    fn clamp_pulls_into_range() {
        let kind = SettingKind::IntegerRange { min: -50, max: 50 };

        assert_eq!(clamp(&kind, SettingValue::Int(75)), SettingValue::Int(50));
        assert_eq!(clamp(&kind, SettingValue::Int(-51)), SettingValue::Int(-50));
        assert_eq!(clamp(&kind, SettingValue::Int(12)), SettingValue::Int(12));
    }

    #[test]
    fn clamp_leaves_closed_domains() {
        assert_eq!(
            clamp(&SettingKind::Boolean, SettingValue::Bool(true)),
            SettingValue::Bool(true)
        );
        let kind = SettingKind::Enumeration {
            variants: &["a", "b"],
        };
        assert_eq!(clamp(&kind, SettingValue::Variant("b")), SettingValue::Variant("b"));
    }

    #[test]
    fn clamp_raw_handles_wide_input() {
        let kind = SettingKind::IntegerRange { min: 2, max: 4 };
        assert_eq!(clamp_raw(&kind, i64::MAX), Some(4));
        assert_eq!(clamp_raw(&kind, i64::MIN), Some(2));
        assert_eq!(clamp_raw(&SettingKind::Boolean, 3), None);
    }

    #[test]
    fn gate_controls_activity() {
        let schema = Schema::builtin();
        let desc = schema.get(ids::WILD_LEVEL_MODIFIER).unwrap();
        let value = SettingValue::Int(10);

        assert!(!is_enabled(desc, value, |_| Some(SettingValue::Bool(false))));
        assert!(is_enabled(desc, value, |_| Some(SettingValue::Bool(true))));
        assert!(!is_enabled(desc, value, |_| None));
    }

    #[test]
    fn nonzero_toggle() {
        let schema = Schema::builtin();
        let desc = schema.get(ids::ADDITIONAL_BOSS_TRAINER_POKEMON).unwrap();

        assert!(!is_enabled(desc, SettingValue::Int(0), |_| None));
        assert!(is_enabled(desc, SettingValue::Int(2), |_| None));
    }
}
