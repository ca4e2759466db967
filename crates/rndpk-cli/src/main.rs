//! `rndpk` - inspect and upgrade settings strings from the command line

mod logging;

use std::fmt::Write as _;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rndpk_session::{batch_capacity, MemoryProbe, SessionConfig, SystemMemory};
use rndpk_settings::{Category, Codec, DecodedSettings, Schema, SettingDescriptor, SettingKind};
use serde_json::{Map, Value};

use crate::logging::{init_logging, LogConfig, LogFormat};

fn cli() -> Command {
    Command::new("rndpk")
        .version(rndpk_settings::VERSION)
        .about("Inspect, decode and upgrade randomizer settings strings")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Session configuration file (TOML)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("compact")
                .value_parser(["pretty", "compact", "json"])
                .help("Format of log lines on stderr"),
        )
        .subcommand(
            Command::new("describe")
                .about("List every setting the schema declares")
                .arg(
                    Arg::new("generation")
                        .long("generation")
                        .value_parser(value_parser!(u8))
                        .help("Only settings supported by this artifact generation"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("decode")
                .about("Decode a settings string and print its values")
                .arg(Arg::new("settings").required(true).help("Settings string"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("upgrade")
                .about("Rewrite a settings string at the current format version")
                .arg(Arg::new("settings").required(true).help("Settings string")),
        )
        .subcommand(
            Command::new("capacity")
                .about("Estimate how many randomized copies of an artifact fit in memory")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Artifact file"),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let format = matches
        .get_one::<String>("log-format")
        .and_then(|name| LogFormat::parse(name))
        .unwrap_or_default();
    init_logging(
        &LogConfig::from_verbosity(matches.get_count("verbose"))
            .with_format(format)
            .with_ansi(io::stderr().is_terminal()),
    );

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SessionConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let output = run(&matches, &config)?;
    print!("{output}");
    Ok(())
}

/// Execute the selected subcommand, returning what goes to stdout
fn run(matches: &ArgMatches, config: &SessionConfig) -> Result<String> {
    let schema = Schema::builtin();
    match matches.subcommand() {
        Some(("describe", args)) => {
            let generation = args.get_one::<u8>("generation").copied();
            describe(&schema, generation, args.get_flag("json"))
        }
        Some(("decode", args)) => {
            let text = settings_arg(args)?;
            let decoded = Codec::standard()
                .decode(text, &schema)
                .context("settings string rejected")?;
            tracing::info!("Decoded settings string written at format {:03}", decoded.version);
            if args.get_flag("json") {
                Ok(format!("{}\n", serde_json::to_string_pretty(&decoded_json(&decoded))?))
            } else {
                Ok(decoded_text(&decoded))
            }
        }
        Some(("upgrade", args)) => {
            let text = settings_arg(args)?;
            let upgraded = Codec::standard()
                .upgrade(text, &schema)
                .context("settings string rejected")?;
            Ok(format!("{upgraded}\n"))
        }
        Some(("capacity", args)) => {
            let path = args.get_one::<PathBuf>("file").context("missing artifact file")?;
            capacity(path, config)
        }
        Some((other, _)) => anyhow::bail!("unknown command {other}"),
        None => anyhow::bail!("no command given"),
    }
}

fn settings_arg(args: &ArgMatches) -> Result<&str> {
    args.get_one::<String>("settings")
        .map(String::as_str)
        .context("missing settings string")
}

fn describe(schema: &Schema, generation: Option<u8>, json: bool) -> Result<String> {
    let selected: Vec<&SettingDescriptor> = match generation {
        Some(generation) => schema.supported(generation).collect(),
        None => schema.describe().iter().collect(),
    };
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&selected)?));
    }

    let mut out = String::new();
    for category in Category::ALL {
        let mut in_category = selected.iter().filter(|d| d.category == category).peekable();
        if in_category.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "{}", category.title());
        for desc in in_category {
            let _ = writeln!(out, "  {:<36} {:<40} default {}", desc.id.as_str(), domain(&desc.kind), desc.default);
        }
    }
    Ok(out)
}

fn domain(kind: &SettingKind) -> String {
    match kind {
        SettingKind::Boolean => "boolean".to_string(),
        SettingKind::IntegerRange { min, max } => format!("integer {min}..={max}"),
        SettingKind::Enumeration { variants } => variants.join("|"),
    }
}

fn decoded_text(decoded: &DecodedSettings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "format  {:03}", decoded.version);
    if let Some(name) = &decoded.rom_name {
        let _ = writeln!(out, "rom     {name}");
    }
    for (id, value) in decoded.values.iter() {
        let _ = writeln!(out, "{id} = {value}");
    }
    for (title, names) in decoded.custom_names.iter().flat_map(|n| n.lists()) {
        if !names.is_empty() {
            let _ = writeln!(out, "{title}: {}", names.join(", "));
        }
    }
    out
}

fn decoded_json(decoded: &DecodedSettings) -> Value {
    let values: Map<String, Value> = decoded
        .values
        .iter()
        .map(|(id, value)| (id.as_str().to_string(), serde_json::json!(value)))
        .collect();
    serde_json::json!({
        "version": decoded.version,
        "rom": decoded.rom_name,
        "values": values,
        "custom_names": decoded.custom_names,
    })
}

fn capacity(path: &Path, config: &SessionConfig) -> Result<String> {
    let size = fs::metadata(path)
        .with_context(|| format!("reading {}", path.display()))?
        .len();
    let memory = SystemMemory::refresh();
    let available = memory.available_memory();
    let copies = batch_capacity(available, size, config.batch_safety_factor);
    tracing::info!(
        "{} bytes per copy, {} bytes available, safety factor {}",
        size,
        available,
        config.batch_safety_factor
    );
    Ok(format!("{copies}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run_args(args: &[&str]) -> Result<String> {
        let matches = cli().try_get_matches_from(args)?;
        run(&matches, &SessionConfig::default())
    }

    #[test]
    fn command_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn upgrade_prints_current_format() {
        let out = run_args(&["rndpk", "upgrade", r#"002{"starters_mod":"RANDOM"}"#]).unwrap();
        assert_eq!(out, "003{\"starters_mod\":\"completely_random\"}\n");
    }

    #[test]
    fn decode_lists_values() {
        let out = run_args(&["rndpk", "decode", r#"003{"@rom":"Pokemon Red","update_moves":true}"#]).unwrap();
        assert_eq!(out, "format  003\nrom     Pokemon Red\nupdate_moves = true\n");
    }

    #[test]
    fn decode_json_has_values_object() {
        let out = run_args(&["rndpk", "decode", "--json", r#"003{"wild_level_modifier":400}"#]).unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["version"], 3);
        assert_eq!(json["rom"], Value::Null);
        assert_eq!(json["values"]["wild_level_modifier"], 50);
    }

    #[test]
    fn decode_shows_custom_names() {
        let text = r#"003{"@names":{"trainer_names":["Ash","Gary"]}}"#;
        let out = run_args(&["rndpk", "decode", text]).unwrap();
        assert_eq!(out, "format  003\nTrainer Names: Ash, Gary\n");

        let json: Value = serde_json::from_str(&run_args(&["rndpk", "decode", "--json", text]).unwrap()).unwrap();
        assert_eq!(json["custom_names"]["trainer_names"][1], "Gary");
    }

    #[test]
    fn newer_string_is_rejected() {
        assert!(run_args(&["rndpk", "decode", "999{}"]).is_err());
    }

    #[test]
    fn describe_groups_by_category() {
        let out = run_args(&["rndpk", "describe"]).unwrap();
        assert!(out.starts_with(Category::BaseStats.title()));
        assert!(out.contains("wild_level_modifier"));
    }

    #[test]
    fn describe_json_is_an_array() {
        let out = run_args(&["rndpk", "describe", "--json"]).unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(Schema::builtin().len()));
    }

    #[test]
    fn capacity_of_missing_file_fails() {
        assert!(run_args(&["rndpk", "capacity", "/nonexistent/red.gb"]).is_err());
    }
}
