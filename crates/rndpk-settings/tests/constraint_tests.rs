use proptest::prelude::*;
use rndpk_settings::constraint::{clamp, clamp_raw};
use rndpk_settings::derived::{base_stat_generations, move_generations};
use rndpk_settings::schema::ids;
use rndpk_settings::{SettingKind, SettingValue, SettingsError, SettingsRegistry, HIGHEST_GENERATION};

fn arb_range() -> impl Strategy<Value = SettingKind> {
    (-1000..1000i32, 0..500i32).prop_map(|(min, width)| SettingKind::IntegerRange { min, max: min + width })
}

proptest! {
    #[test]
    fn prop_clamp_is_idempotent(kind in arb_range(), raw in any::<i32>()) {
        let once = clamp(&kind, SettingValue::Int(raw));
        prop_assert_eq!(clamp(&kind, once), once);
        prop_assert!(kind.contains(&once));
    }

    #[test]
    fn prop_clamp_raw_stays_in_range(kind in arb_range(), raw in any::<i64>()) {
        let clamped = clamp_raw(&kind, raw).unwrap();
        prop_assert!(kind.contains(&SettingValue::Int(clamped)));
    }

    #[test]
    fn prop_derived_sets_stay_in_bounds(generation in 0..=u8::MAX) {
        for g in base_stat_generations(generation, HIGHEST_GENERATION) {
            prop_assert!(g > i32::from(generation) && g <= i32::from(HIGHEST_GENERATION));
        }
        prop_assert!(base_stat_generations(generation, HIGHEST_GENERATION).len() <= 3);
        for g in move_generations(generation, HIGHEST_GENERATION) {
            prop_assert!(g > i32::from(generation));
        }
    }

    #[test]
    fn prop_registry_ints_always_in_range(raw in any::<i64>()) {
        let mut reg = SettingsRegistry::with_builtin();
        reg.set_int_raw(ids::TRAINERS_FORCE_FULLY_EVOLVED_LEVEL, raw).unwrap();
        let level = reg.int(ids::TRAINERS_FORCE_FULLY_EVOLVED_LEVEL).unwrap();
        prop_assert!((30..=65).contains(&level));
    }
}

#[test]
fn first_generation_base_stats() {
    assert_eq!(base_stat_generations(1, HIGHEST_GENERATION), vec![6, 7, 8]);
}

#[test]
fn seventh_generation_moves() {
    assert_eq!(move_generations(7, HIGHEST_GENERATION), vec![8]);
}

#[test]
fn disabled_gate_removes_value_from_run_snapshot() {
    let mut reg = SettingsRegistry::with_builtin();
    reg.set(ids::TMS_FORCE_GOOD_DAMAGING, SettingValue::Bool(true)).unwrap();
    reg.set(ids::TMS_GOOD_DAMAGING_PERCENT, SettingValue::Int(40)).unwrap();
    assert_eq!(reg.active_snapshot().get_int(ids::TMS_GOOD_DAMAGING_PERCENT), Some(40));

    reg.set_enabled(ids::TMS_GOOD_DAMAGING_PERCENT, false).unwrap();

    assert!(!reg.active_snapshot().contains(ids::TMS_GOOD_DAMAGING_PERCENT));
    assert_eq!(reg.int(ids::TMS_GOOD_DAMAGING_PERCENT).unwrap(), 40);
}

#[test]
fn artifact_reload_recomputes_from_scratch() {
    let mut reg = SettingsRegistry::with_builtin();
    reg.refresh_derived(7, HIGHEST_GENERATION);
    reg.refresh_derived(2, HIGHEST_GENERATION);

    assert_eq!(reg.options(ids::UPDATE_MOVES_TO_GENERATION).map(<[_]>::len), Some(6));
    assert_eq!(reg.options(ids::SELECTED_EXP_CURVE).map(<[_]>::len), Some(4));
    reg.set(ids::UPDATE_MOVES_TO_GENERATION, SettingValue::Int(3)).unwrap();
}

#[test]
fn exp_curve_outside_classic_set_is_rejected_for_old_artifacts() {
    let mut reg = SettingsRegistry::with_builtin();
    reg.refresh_derived(1, HIGHEST_GENERATION);

    let err = reg.set(ids::SELECTED_EXP_CURVE, SettingValue::Variant("erratic")).unwrap_err();
    assert!(matches!(err, SettingsError::NotOffered { .. }));
}
