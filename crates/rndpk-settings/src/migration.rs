//! Settings string migrations
//!
//! Each [`MigrationStep`] upgrades a decoded payload from one format version
//! to the next. Steps are pure transforms over the JSON object; they never
//! consult the live registry.
//!
//! The shipped chain is checked for totality at compile time: adding a format
//! version without its step fails the build.

use serde_json::{Map, Value};

use crate::codec::ROM_TAG;
use crate::error::CodecError;

/// Decoded payload: field tag to JSON value
pub type Payload = Map<String, Value>;

/// Oldest format version this build can read
pub const FIRST_VERSION: u16 = 1;

/// Format version written by this build
pub const CURRENT_VERSION: u16 = 3;

/// One upgrade step `from -> from + 1`
#[derive(Debug, Clone, Copy)]
pub struct MigrationStep {
    /// Version the step reads
    pub from: u16,
    /// What changed in `from + 1`
    pub description: &'static str,
    /// Transform applied in place
    pub apply: fn(&mut Payload) -> Result<(), String>,
}

/// Steps shipped with this build, oldest first
pub const STANDARD_STEPS: &[MigrationStep] = &[
    MigrationStep {
        from: 1,
        description: "split trainer and catch-rate fields",
        apply: v1_to_v2,
    },
    MigrationStep {
        from: 2,
        description: "snake-case enumeration variants",
        apply: v2_to_v3,
    },
];

const _: () = assert!(
    chain_is_total(STANDARD_STEPS, FIRST_VERSION, CURRENT_VERSION),
    "migration chain has a gap"
);

/// Check that `steps` covers every version in `first..current`
#[must_use]
pub const fn chain_is_total(steps: &[MigrationStep], first: u16, current: u16) -> bool {
    let mut version = first;
    while version < current {
        if !has_step(steps, version) {
            return false;
        }
        version += 1;
    }
    true
}

const fn has_step(steps: &[MigrationStep], from: u16) -> bool {
    let mut i = 0;
    while i < steps.len() {
        if steps[i].from == from {
            return true;
        }
        i += 1;
    }
    false
}

/// Ordered migration steps between two versions
#[derive(Debug, Clone)]
pub struct MigrationChain {
    steps: Vec<MigrationStep>,
    first: u16,
    current: u16,
}

impl MigrationChain {
    /// Build a chain, rejecting gaps
    ///
    /// # Errors
    /// Returns [`CodecError::MissingMigration`] naming the first version
    /// without a step.
    pub fn new(steps: &[MigrationStep], first: u16, current: u16) -> Result<Self, CodecError> {
        if let Some(missing) = (first..current).find(|v| !has_step(steps, *v)) {
            return Err(CodecError::MissingMigration(missing));
        }
        let mut steps = steps.to_vec();
        steps.sort_by_key(|s| s.from);
        Ok(Self { steps, first, current })
    }

    /// The shipped chain
    #[must_use]
    pub fn standard() -> Self {
        Self {
            steps: STANDARD_STEPS.to_vec(),
            first: FIRST_VERSION,
            current: CURRENT_VERSION,
        }
    }

    /// Oldest readable version
    #[inline]
    #[must_use]
    pub fn first_version(&self) -> u16 {
        self.first
    }

    /// Version the chain upgrades to
    #[inline]
    #[must_use]
    pub fn current_version(&self) -> u16 {
        self.current
    }

    /// Steps in application order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Upgrade a payload written at `version` to the current version
    ///
    /// # Errors
    /// `MalformedInput` below the first version, `UnsupportedVersion` above
    /// the current one, `MigrationFailed` when a step rejects the payload.
    pub fn migrate(&self, version: u16, payload: &mut Payload) -> Result<(), CodecError> {
        if version < self.first {
            return Err(CodecError::MalformedInput(format!(
                "format {version:03} predates the oldest readable format {:03}",
                self.first
            )));
        }
        if version > self.current {
            return Err(CodecError::UnsupportedVersion {
                found: version,
                current: self.current,
            });
        }

        for from in version..self.current {
            let step = self
                .steps
                .iter()
                .find(|s| s.from == from)
                .ok_or(CodecError::MissingMigration(from))?;
            (step.apply)(payload).map_err(|reason| CodecError::MigrationFailed { from, reason })?;
            tracing::debug!("Migrated settings {:03} -> {:03}: {}", from, from + 1, step.description);
        }
        Ok(())
    }
}

impl Default for MigrationChain {
    fn default() -> Self {
        Self::standard()
    }
}

fn rename(payload: &mut Payload, old: &str, new: &str) {
    if let Some(value) = payload.remove(old) {
        payload.insert(new.to_string(), value);
    }
}

fn v1_to_v2(payload: &mut Payload) -> Result<(), String> {
    rename(payload, "trainer_level_percent", "trainers_level_modifier");
    rename(payload, "levels_modified", "trainers_levels_modified");

    // 0 meant "off"; any other value was the level
    match payload.remove("minimum_catch_rate") {
        None | Some(Value::Null) => {}
        Some(value) => {
            let level = value
                .as_i64()
                .ok_or_else(|| format!("minimum_catch_rate is not an integer: {value}"))?;
            payload.insert("use_minimum_catch_rate".to_string(), Value::Bool(level != 0));
            if level != 0 {
                payload.insert("minimum_catch_rate_level".to_string(), Value::from(level));
            }
        }
    }
    Ok(())
}

fn v2_to_v3(payload: &mut Payload) -> Result<(), String> {
    for (tag, value) in payload.iter_mut() {
        if tag == ROM_TAG {
            continue;
        }
        if let Value::String(variant) = value {
            *variant = variant.to_ascii_lowercase();
        }
    }
    if let Some(Value::String(starters)) = payload.get_mut("starters_mod") {
        if starters.as_str() == "random" {
            *starters = "completely_random".to_string();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn standard_chain_is_total() {
        assert!(chain_is_total(STANDARD_STEPS, FIRST_VERSION, CURRENT_VERSION));
        assert!(MigrationChain::new(STANDARD_STEPS, FIRST_VERSION, CURRENT_VERSION).is_ok());
    }

    #[test]
    fn gap_is_reported() {
        let err = MigrationChain::new(&STANDARD_STEPS[..1], 1, 3).unwrap_err();
        assert_eq!(err, CodecError::MissingMigration(2));
    }

    #[test]
    fn v1_splits_catch_rate() {
        let mut p = payload(json!({ "minimum_catch_rate": 3, "trainer_level_percent": 20 }));
        v1_to_v2(&mut p).unwrap();

        assert_eq!(p["use_minimum_catch_rate"], json!(true));
        assert_eq!(p["minimum_catch_rate_level"], json!(3));
        assert_eq!(p["trainers_level_modifier"], json!(20));
        assert!(!p.contains_key("trainer_level_percent"));
    }

    #[test]
    fn v1_zero_catch_rate_is_off() {
        let mut p = payload(json!({ "minimum_catch_rate": 0 }));
        v1_to_v2(&mut p).unwrap();

        assert_eq!(p["use_minimum_catch_rate"], json!(false));
        assert!(!p.contains_key("minimum_catch_rate_level"));
    }

    #[test]
    fn v1_rejects_non_integer_catch_rate() {
        let mut p = payload(json!({ "minimum_catch_rate": "high" }));
        assert!(v1_to_v2(&mut p).is_err());
    }

    #[test]
    fn v2_lowercases_variants_but_not_rom_name() {
        let mut p = payload(json!({
            "selected_exp_curve": "MEDIUM_FAST",
            "starters_mod": "RANDOM",
            "@rom": "Pokemon RED",
        }));
        v2_to_v3(&mut p).unwrap();

        assert_eq!(p["selected_exp_curve"], json!("medium_fast"));
        assert_eq!(p["starters_mod"], json!("completely_random"));
        assert_eq!(p["@rom"], json!("Pokemon RED"));
    }

    #[test]
    fn migrate_rejects_out_of_range_versions() {
        let chain = MigrationChain::standard();
        let mut p = Payload::new();

        assert!(matches!(chain.migrate(0, &mut p), Err(CodecError::MalformedInput(_))));
        assert!(chain.migrate(CURRENT_VERSION + 1, &mut p).unwrap_err().is_newer_release());
    }

    #[test]
    fn failing_step_names_its_version() {
        let chain = MigrationChain::standard();
        let mut p = payload(json!({ "minimum_catch_rate": [1] }));

        assert!(matches!(
            chain.migrate(1, &mut p),
            Err(CodecError::MigrationFailed { from: 1, .. })
        ));
    }
}
