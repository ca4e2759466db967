use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rndpk_settings::codec::{self, Codec};
use rndpk_settings::schema::ids;
use rndpk_settings::{
    CodecError, MigrationChain, Schema, SettingKind, SettingValue, SettingsRegistry, Snapshot, CURRENT_VERSION,
    FIRST_VERSION, HIGHEST_GENERATION,
};

/// Any in-domain value for each setting of the built-in table
fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    let per_setting: Vec<BoxedStrategy<(_, SettingValue)>> = Schema::builtin()
        .describe()
        .iter()
        .map(|desc| {
            let id = desc.id;
            match desc.kind {
                SettingKind::Boolean => any::<bool>().prop_map(move |b| (id, SettingValue::Bool(b))).boxed(),
                SettingKind::IntegerRange { min, max } => {
                    (min..=max).prop_map(move |v| (id, SettingValue::Int(v))).boxed()
                }
                SettingKind::Enumeration { variants } => proptest::sample::select(variants)
                    .prop_map(move |v| (id, SettingValue::Variant(v)))
                    .boxed(),
            }
        })
        .collect();
    per_setting.prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(snapshot in arb_snapshot(), rom in proptest::option::of("[A-Za-z ]{1,16}")) {
        let schema = Schema::builtin();
        let text = codec::encode_snapshot(&snapshot, rom.as_deref());
        let decoded = codec::decode(&text, &schema).unwrap();

        prop_assert_eq!(decoded.values, snapshot);
        prop_assert_eq!(decoded.rom_name, rom);
        prop_assert_eq!(decoded.version, CURRENT_VERSION);
    }

    #[test]
    fn prop_newer_versions_are_rejected(version in (CURRENT_VERSION + 1)..1000u16) {
        let text = format!("{version:03}{{}}");
        let err = codec::decode(&text, &Schema::builtin()).unwrap_err();
        prop_assert!(err.is_newer_release());
    }
}

#[test]
fn every_older_version_migrates() {
    let schema = Schema::builtin();
    for version in FIRST_VERSION..CURRENT_VERSION {
        let text = format!("{version:03}{{\"update_moves\":true}}");
        let decoded = codec::decode(&text, &schema).unwrap();

        assert_eq!(decoded.version, version);
        assert_eq!(decoded.values.get_bool(ids::UPDATE_MOVES), Some(true));
    }
}

#[test]
fn legacy_v1_string_decodes() {
    let text = r#"001{"@rom":"Pokemon Red","levels_modified":true,"trainer_level_percent":-20,"minimum_catch_rate":2,"selected_exp_curve":"MEDIUM_SLOW","starters_mod":"RANDOM"}"#;
    let decoded = codec::decode(text, &Schema::builtin()).unwrap();

    let values = &decoded.values;
    assert_eq!(decoded.rom_name.as_deref(), Some("Pokemon Red"));
    assert_eq!(values.get_bool(ids::TRAINERS_LEVELS_MODIFIED), Some(true));
    assert_eq!(values.get_int(ids::TRAINERS_LEVEL_MODIFIER), Some(-20));
    assert_eq!(values.get_bool(ids::USE_MINIMUM_CATCH_RATE), Some(true));
    assert_eq!(values.get_int(ids::MINIMUM_CATCH_RATE_LEVEL), Some(2));
    assert_eq!(values.get(ids::SELECTED_EXP_CURVE), Some(SettingValue::Variant("medium_slow")));
    assert_eq!(values.get(ids::STARTERS_MOD), Some(SettingValue::Variant("completely_random")));
}

#[test]
fn legacy_v2_string_decodes() {
    let text = r#"002{"types_mod":"COMPLETELY_RANDOM","wild_level_modifier":12}"#;
    let decoded = codec::decode(text, &Schema::builtin()).unwrap();

    assert_eq!(decoded.values.get(ids::TYPES_MOD), Some(SettingValue::Variant("completely_random")));
    assert_eq!(decoded.values.get_int(ids::WILD_LEVEL_MODIFIER), Some(12));
}

#[test]
fn version_zero_is_malformed() {
    let err = codec::decode("000{}", &Schema::builtin()).unwrap_err();
    assert!(matches!(err, CodecError::MalformedInput(_)));
}

#[test]
fn custom_chain_with_gap_is_rejected() {
    let err = MigrationChain::new(&[], FIRST_VERSION, CURRENT_VERSION).unwrap_err();
    assert_eq!(err, CodecError::MissingMigration(FIRST_VERSION));
}

#[test]
fn registry_round_trip_preserves_inert_values() {
    let mut reg = SettingsRegistry::with_builtin();
    reg.set(ids::WILD_LEVEL_MODIFIER, SettingValue::Int(-30)).unwrap();
    reg.set_enabled(ids::WILD_LEVEL_MODIFIER, false).unwrap();

    let decoded = codec::decode(&codec::encode(&reg), reg.schema()).unwrap();
    let mut other = SettingsRegistry::with_builtin();
    other.merge(&decoded.values).unwrap();

    assert_eq!(other.int(ids::WILD_LEVEL_MODIFIER).unwrap(), -30);
    assert_eq!(other.snapshot(), reg.snapshot());
}

#[test]
fn merge_leaves_absent_fields_untouched() {
    let mut reg = SettingsRegistry::with_builtin();
    reg.set(ids::GUARANTEED_MOVE_COUNT, SettingValue::Int(4)).unwrap();

    let decoded = codec::decode(r#"003{"guaranteed_move_count":null,"ban_bad_items":true}"#, reg.schema()).unwrap();
    assert_eq!(reg.merge(&decoded.values).unwrap(), 1);

    assert_eq!(reg.int(ids::GUARANTEED_MOVE_COUNT).unwrap(), 4);
    assert!(reg.bool(ids::BAN_BAD_ITEMS).unwrap());
}

#[test]
fn merge_after_artifact_load_keeps_unoffered_generation() {
    let mut reg = SettingsRegistry::with_builtin();
    reg.refresh_derived(7, HIGHEST_GENERATION);

    let decoded = Codec::standard()
        .decode(r#"003{"update_moves_to_generation":5,"update_moves":true}"#, reg.schema())
        .unwrap();
    reg.merge(&decoded.values).unwrap();

    assert_eq!(reg.int(ids::UPDATE_MOVES_TO_GENERATION).unwrap(), 8);
    assert!(reg.bool(ids::UPDATE_MOVES).unwrap());
}
