//! Versioned settings strings
//!
//! A settings string is a three-digit, zero-padded format version followed by
//! a JSON object keyed by setting identifier:
//!
//! ```text
//! 003{"@rom":"Pokemon Red","types_mod":"completely_random","wild_level_modifier":12}
//! ```
//!
//! Older strings are upgraded through the [`MigrationChain`] before their
//! values are read; strings from a newer release are rejected. Unknown tags
//! are skipped and `null` means "no value". Non-empty custom name lists
//! travel under [`NAMES_TAG`].

use serde_json::{Map, Value};

use crate::constraint::clamp_raw;
use crate::error::{CodecError, SettingsError};
use crate::migration::{MigrationChain, Payload, CURRENT_VERSION};
use crate::names::{CustomNames, NAMES_TAG};
use crate::registry::SettingsRegistry;
use crate::schema::{Schema, SettingKind};
use crate::value::{SettingValue, Snapshot};

/// Reserved tag carrying the artifact name
pub const ROM_TAG: &str = "@rom";

/// Width of the version header
pub const HEADER_LEN: usize = 3;

/// Result of decoding a settings string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSettings {
    /// Format version the string was written in
    pub version: u16,
    /// Artifact name recorded by the writer
    pub rom_name: Option<String>,
    /// Values present in the string, clamped into range
    pub values: Snapshot,
    /// Custom name lists, if the string carried any
    pub custom_names: Option<CustomNames>,
}

/// Encode every stored value of a registry at the current version
#[must_use]
pub fn encode(registry: &SettingsRegistry) -> String {
    encode_payload(&registry.snapshot(), registry.rom_name(), Some(registry.custom_names()))
}

/// Encode a snapshot at the current version
#[must_use]
pub fn encode_snapshot(snapshot: &Snapshot, rom_name: Option<&str>) -> String {
    encode_payload(snapshot, rom_name, None)
}

/// Re-encode decoded settings at the current version
#[must_use]
pub fn encode_decoded(decoded: &DecodedSettings) -> String {
    encode_payload(&decoded.values, decoded.rom_name.as_deref(), decoded.custom_names.as_ref())
}

fn encode_payload(snapshot: &Snapshot, rom_name: Option<&str>, names: Option<&CustomNames>) -> String {
    let mut payload = Map::new();
    if let Some(name) = rom_name {
        payload.insert(ROM_TAG.to_string(), Value::String(name.to_string()));
    }
    if let Some(names) = names.filter(|n| !n.is_empty()) {
        match serde_json::to_value(names) {
            Ok(json) => {
                payload.insert(NAMES_TAG.to_string(), json);
            }
            Err(e) => tracing::error!("Leaving custom names out of settings string: {}", e),
        }
    }
    for (id, value) in snapshot.iter() {
        let json = match value {
            SettingValue::Bool(b) => Value::Bool(b),
            SettingValue::Int(v) => Value::from(v),
            SettingValue::Variant(v) => Value::String(v.to_string()),
        };
        payload.insert(id.as_str().to_string(), json);
    }
    format!("{CURRENT_VERSION:03}{}", Value::Object(payload))
}

/// Read the version header without touching the payload
///
/// # Errors
/// Returns [`CodecError::MalformedInput`] if the first three characters are
/// not ASCII digits.
pub fn split_header(text: &str) -> Result<(u16, &str), CodecError> {
    let header = text
        .get(..HEADER_LEN)
        .filter(|h| h.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| CodecError::MalformedInput(format!("missing {HEADER_LEN}-digit version header")))?;
    let version = header
        .parse::<u16>()
        .map_err(|e| CodecError::MalformedInput(format!("bad version header {header:?}: {e}")))?;
    Ok((version, &text[HEADER_LEN..]))
}

/// Decoder with a migration chain
#[derive(Debug, Clone, Default)]
pub struct Codec {
    chain: MigrationChain,
}

impl Codec {
    /// Create codec over a custom chain
    #[must_use]
    pub fn new(chain: MigrationChain) -> Self {
        Self { chain }
    }

    /// Codec over the shipped chain
    #[must_use]
    pub fn standard() -> Self {
        Self::new(MigrationChain::standard())
    }

    /// Migration chain in use
    #[inline]
    #[must_use]
    pub fn chain(&self) -> &MigrationChain {
        &self.chain
    }

    /// Decode a settings string against a schema
    ///
    /// # Errors
    /// - `MalformedInput`: bad header, unparsable payload, wrong JSON kinds
    /// - `UnsupportedVersion`: written by a newer release
    /// - `MigrationFailed` / `MissingMigration`: upgrade failed
    /// - `InvalidValue`: an enumeration variant the schema does not declare
    pub fn decode(&self, text: &str, schema: &Schema) -> Result<DecodedSettings, CodecError> {
        let text = text.trim_end();
        let (version, body) = split_header(text)?;
        if version > self.chain.current_version() {
            return Err(CodecError::UnsupportedVersion {
                found: version,
                current: self.chain.current_version(),
            });
        }

        let mut payload = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(CodecError::MalformedInput(format!(
                    "payload is not an object: {other}"
                )))
            }
            Err(e) => return Err(CodecError::MalformedInput(e.to_string())),
        };
        self.chain.migrate(version, &mut payload)?;

        let decoded = read_payload(version, payload, schema)?;
        tracing::debug!(
            "Decoded {} settings from format {:03}",
            decoded.values.len(),
            decoded.version
        );
        Ok(decoded)
    }

    /// Rewrite a settings string at the current version
    ///
    /// Unknown tags are dropped.
    ///
    /// # Errors
    /// See [`Codec::decode`].
    pub fn upgrade(&self, text: &str, schema: &Schema) -> Result<String, CodecError> {
        let decoded = self.decode(text, schema)?;
        Ok(encode_decoded(&decoded))
    }
}

/// Decode with the shipped chain
///
/// # Errors
/// See [`Codec::decode`].
pub fn decode(text: &str, schema: &Schema) -> Result<DecodedSettings, CodecError> {
    Codec::standard().decode(text, schema)
}

fn read_payload(version: u16, payload: Payload, schema: &Schema) -> Result<DecodedSettings, CodecError> {
    let mut rom_name = None;
    let mut custom_names = None;
    let mut values = Snapshot::new();

    for (tag, json) in payload {
        if tag == ROM_TAG {
            rom_name = match json {
                Value::Null => None,
                Value::String(name) => Some(name),
                other => {
                    return Err(CodecError::MalformedInput(format!(
                        "{ROM_TAG} must be a string, got {other}"
                    )))
                }
            };
            continue;
        }
        if tag == NAMES_TAG {
            custom_names = match json {
                Value::Null => None,
                json @ Value::Object(_) => Some(
                    serde_json::from_value(json)
                        .map_err(|e| CodecError::MalformedInput(format!("{NAMES_TAG}: {e}")))?,
                ),
                other => {
                    return Err(CodecError::MalformedInput(format!(
                        "{NAMES_TAG} must be an object, got {other}"
                    )))
                }
            };
            continue;
        }
        let Some(desc) = schema.find(&tag) else {
            tracing::warn!("Skipping unknown settings field {}", tag);
            continue;
        };
        if json.is_null() {
            continue;
        }

        let value = match (desc.kind, &json) {
            (SettingKind::Boolean, Value::Bool(b)) => SettingValue::Bool(*b),
            (kind @ SettingKind::IntegerRange { .. }, Value::Number(n)) => n
                .as_i64()
                .and_then(|raw| clamp_raw(&kind, raw))
                .map(SettingValue::Int)
                .ok_or_else(|| CodecError::MalformedInput(format!("{tag} must be an integer, got {n}")))?,
            (kind @ SettingKind::Enumeration { .. }, Value::String(name)) => {
                let variant = kind.variant(name).ok_or_else(|| SettingsError::UnknownVariant {
                    id: desc.id,
                    value: name.clone(),
                })?;
                SettingValue::Variant(variant)
            }
            (kind, other) => {
                return Err(CodecError::MalformedInput(format!(
                    "{tag} must be a {}, got {other}",
                    kind.name()
                )))
            }
        };
        values.insert(desc.id, value);
    }

    Ok(DecodedSettings {
        version,
        rom_name,
        values,
        custom_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::NameList;
    use crate::schema::ids;

    #[test]
    fn encode_starts_with_padded_version() {
        let reg = SettingsRegistry::with_builtin();
        let text = encode(&reg);

        assert!(text.starts_with("003{"));
        assert!(text.contains("\"types_mod\":\"unchanged\""));
    }

    #[test]
    fn rom_name_round_trips() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.set_rom_name(Some("Pokemon Red".to_string()));

        let decoded = decode(&encode(&reg), reg.schema()).unwrap();
        assert_eq!(decoded.rom_name.as_deref(), Some("Pokemon Red"));
        assert_eq!(decoded.version, CURRENT_VERSION);
    }

    #[test]
    fn header_is_checked_before_payload() {
        let schema = Schema::builtin();

        for text in ["", "03", "x03{}", "3a1{}", " 003{}", "\n003{}"] {
            assert!(
                matches!(decode(text, &schema), Err(CodecError::MalformedInput(_))),
                "{text:?} should be malformed"
            );
        }
        assert!(decode("003{}\r\n", &schema).is_ok());
        // Newer version wins over the broken payload
        assert!(decode("999not json", &schema).unwrap_err().is_newer_release());
    }

    #[test]
    fn unknown_tags_and_nulls_are_skipped() {
        let schema = Schema::builtin();
        let decoded = decode(r#"003{"hyper_mode":true,"types_mod":null,"update_moves":true}"#, &schema).unwrap();

        assert_eq!(decoded.values.len(), 1);
        assert_eq!(decoded.values.get_bool(ids::UPDATE_MOVES), Some(true));
    }

    #[test]
    fn integers_are_clamped_on_decode() {
        let schema = Schema::builtin();
        let decoded = decode(r#"003{"wild_level_modifier":400}"#, &schema).unwrap();
        assert_eq!(decoded.values.get_int(ids::WILD_LEVEL_MODIFIER), Some(50));
    }

    #[test]
    fn wrong_json_kind_is_malformed() {
        let schema = Schema::builtin();
        assert!(matches!(
            decode(r#"003{"update_moves":"yes"}"#, &schema),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(
            decode(r#"003{"wild_level_modifier":1.5}"#, &schema),
            Err(CodecError::MalformedInput(_))
        ));
    }

    #[test]
    fn unknown_variant_is_invalid_value() {
        let schema = Schema::builtin();
        let err = decode(r#"003{"types_mod":"sideways"}"#, &schema).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidValue(SettingsError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn custom_names_travel_with_the_string() {
        let mut reg = SettingsRegistry::with_builtin();
        reg.custom_names_mut()
            .list_mut(NameList::PokemonNicknames)
            .push("Sparky".to_string());

        let text = encode(&reg);
        assert!(text.contains(r#""@names":{"#));
        let decoded = decode(&text, reg.schema()).unwrap();
        assert_eq!(decoded.custom_names.as_ref(), Some(reg.custom_names()));
    }

    #[test]
    fn empty_custom_names_are_left_out() {
        let reg = SettingsRegistry::with_builtin();
        let text = encode(&reg);

        assert!(!text.contains(NAMES_TAG));
        assert_eq!(decode(&text, reg.schema()).unwrap().custom_names, None);
    }

    #[test]
    fn malformed_custom_names_are_rejected() {
        let schema = Schema::builtin();
        for text in [r#"003{"@names":["Ash"]}"#, r#"003{"@names":{"trainer_names":"Ash"}}"#] {
            assert!(matches!(decode(text, &schema), Err(CodecError::MalformedInput(_))));
        }
    }

    #[test]
    fn upgrade_rewrites_legacy_string() {
        let schema = Schema::builtin();
        let upgraded = Codec::standard()
            .upgrade(r#"002{"starters_mod":"RANDOM"}"#, &schema)
            .unwrap();
        assert_eq!(upgraded, r#"003{"starters_mod":"completely_random"}"#);
    }
}
