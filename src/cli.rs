//! Command Line Interface
//!
//! Front end over the core library: hashing, digests, profile fingerprints,
//! matching and settings management.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use cp_core::constants::exact::DEFAULT_SEED;
use cp_core::{
    compute_fingerprint_with_seed, digest_str, hash32_str, load_settings, load_settings_from,
    save_settings_to, try_similarity, FingerprintMatcher, Fingerprinter, FuzzyDigest,
    OptionOverrides, Settings,
};
use tracing::debug;

use crate::profile::load_profile;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "CLIENTPRINT_LOG";

#[derive(Parser, Debug)]
#[command(name = "clientprint")]
#[command(version)]
#[command(about = "Clientprint - exact and fuzzy client fingerprints")]
#[command(long_about = "Clientprint - exact and fuzzy client fingerprints

Computes a 32-bit exact fingerprint and a fuzzy, comparable digest from the
signals a client reports. Client signals are read from JSON profiles mapping
collector names (getUserAgent, getLanguage, ...) to values.

EXAMPLES:
    clientprint hash 'UA1|1920x1080|...'          MurmurHash3 of a key (seed 256)
    clientprint custom custom fingerprint        Fingerprint of arbitrary values
    clientprint fingerprint --profile client.json
    clientprint digest --profile client.json --set getIPs=true
    clientprint ctph 'some text'                 Fuzzy digest of text
    clientprint compare F:abc:de F:abd:de        Similarity score (0-100)
    clientprint match F:abc:de --known known.json
    clientprint settings show                    Show effective settings as JSON

ENVIRONMENT VARIABLES:
    CLIENTPRINT_LOG=debug     Log filter (default: warn), written to stderr

FILES:
    ~/.config/clientprint/settings.json      Option overrides, build, fonts, seed")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// MurmurHash3 (x86, 32-bit) of a key string
    Hash {
        key: String,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u32,
    },

    /// Exact fingerprint of arbitrary values
    Custom {
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Exact fingerprint of a client profile
    Fingerprint {
        /// Profile JSON file
        #[arg(long)]
        profile: PathBuf,
    },

    /// Extended fuzzy fingerprint of a client profile, as JSON
    Digest {
        /// Profile JSON file
        #[arg(long)]
        profile: PathBuf,
        /// Include or exclude a signal: name=true|false (repeatable)
        #[arg(long = "set", value_parser = parse_override)]
        overrides: Vec<(String, bool)>,
    },

    /// Fuzzy digest of text
    Ctph { text: String },

    /// Similarity (0-100) between two fuzzy digests
    Compare { a: String, b: String },

    /// Best match for a digest among known clients
    Match {
        digest: String,
        /// JSON object mapping client ids to digests
        #[arg(long)]
        known: PathBuf,
        /// Minimum score; defaults to the configured threshold
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Settings management
    #[command(subcommand, about = "View and create the settings file")]
    Settings(SettingsCommands),
}

// ============================================================================
// Settings Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show effective settings as JSON
    Show,
    /// Write default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the settings file path
    Path,
}

/// Parse a `name=bool` option override
fn parse_override(s: &str) -> Result<(String, bool), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=true|false, got '{}'", s))?;
    let enabled = value
        .trim()
        .parse::<bool>()
        .map_err(|_| format!("'{}' is not true or false", value))?;
    Ok((name.trim().to_string(), enabled))
}

/// Run a parsed command and return what it prints
pub async fn run_cli(cli: &Cli) -> anyhow::Result<String> {
    debug!(command = ?cli.command, "Running command");
    match &cli.command {
        Commands::Hash { key, seed } => Ok(hash32_str(key, *seed).to_string()),
        Commands::Custom { values } => {
            let settings = settings_for(cli)?;
            let fingerprint =
                compute_fingerprint_with_seed(values.iter().map(String::as_str), settings.seed);
            Ok(fingerprint.to_string())
        }
        Commands::Fingerprint { profile } => cmd_fingerprint(cli, profile),
        Commands::Digest { profile, overrides } => cmd_digest(cli, profile, overrides).await,
        Commands::Ctph { text } => Ok(digest_str(text)),
        Commands::Compare { a, b } => {
            let score = try_similarity(a, b)?;
            Ok(format!("{:.2}", score))
        }
        Commands::Match {
            digest,
            known,
            threshold,
        } => cmd_match(cli, digest, known, *threshold),
        Commands::Settings(cmd) => cmd_settings(cli, cmd),
    }
}

fn settings_for(cli: &Cli) -> anyhow::Result<Settings> {
    let settings = match &cli.settings {
        Some(path) => load_settings_from(path)?,
        None => load_settings()?,
    };
    Ok(settings)
}

fn fingerprinter_for(cli: &Cli, profile: &Path) -> anyhow::Result<Fingerprinter> {
    let settings = settings_for(cli)?;
    let profile = load_profile(profile)
        .with_context(|| format!("Failed to load profile {}", profile.display()))?;
    let registry = profile.registry(&settings.font_candidates())?;
    Ok(Fingerprinter::from_settings(registry, &settings)?)
}

fn cmd_fingerprint(cli: &Cli, profile: &Path) -> anyhow::Result<String> {
    let fingerprinter = fingerprinter_for(cli, profile)?;
    Ok(fingerprinter.get_fingerprint()?.to_string())
}

async fn cmd_digest(cli: &Cli, profile: &Path, overrides: &[(String, bool)]) -> anyhow::Result<String> {
    let fingerprinter = fingerprinter_for(cli, profile)?;
    let mut options = OptionOverrides::new();
    for (name, enabled) in overrides {
        options.set(name.clone(), *enabled);
    }

    let fingerprint = fingerprinter.get_fingerprint_async(&options).await?;
    Ok(serde_json::to_string_pretty(&fingerprint)?)
}

fn cmd_match(cli: &Cli, digest: &str, known: &Path, threshold: Option<f64>) -> anyhow::Result<String> {
    let probe: FuzzyDigest = digest.parse()?;
    let content = fs::read_to_string(known)
        .with_context(|| format!("Failed to read {}", known.display()))?;
    let known: BTreeMap<String, String> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", known.display()))?;

    let threshold = match threshold {
        Some(t) => t,
        None => settings_for(cli)?.match_threshold,
    };
    let matcher = FingerprintMatcher::new(threshold);
    let candidates = known.iter().map(|(id, d)| (id.as_str(), d.as_str()));

    match matcher.best_match(&probe, candidates) {
        Some(found) => Ok(format!("{} {:.2}", found.id, found.score)),
        None => Ok(format!("No match at or above {:.2}", matcher.threshold())),
    }
}

fn cmd_settings(cli: &Cli, cmd: &SettingsCommands) -> anyhow::Result<String> {
    let path = match &cli.settings {
        Some(path) => path.clone(),
        None => cp_core::get_settings_path()?,
    };

    match cmd {
        SettingsCommands::Show => {
            let settings = load_settings_from(&path)?;
            Ok(serde_json::to_string_pretty(&settings)?)
        }
        SettingsCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite.",
                    path.display()
                );
            }
            save_settings_to(&path, &Settings::default())?;
            Ok(format!("Wrote default settings to {}", path.display()))
        }
        SettingsCommands::Path => Ok(path.display().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("getIPs=true"), Ok(("getIPs".to_string(), true)));
        assert_eq!(
            parse_override("getCanvasPrint = false"),
            Ok(("getCanvasPrint".to_string(), false))
        );
        assert!(parse_override("getIPs").is_err());
        assert!(parse_override("getIPs=yes").is_err());
    }

    #[test]
    fn test_parse_digest_overrides() {
        let cli = parse(&[
            "clientprint",
            "digest",
            "--profile",
            "client.json",
            "--set",
            "getIPs=true",
            "--set",
            "getLanguage=false",
        ]);
        match cli.command {
            Commands::Digest { overrides, .. } => assert_eq!(
                overrides,
                vec![("getIPs".to_string(), true), ("getLanguage".to_string(), false)]
            ),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_custom_requires_values() {
        assert!(Cli::try_parse_from(["clientprint", "custom"]).is_err());
    }

    #[tokio::test]
    async fn test_hash_command() {
        let out = run_cli(&parse(&["clientprint", "hash", "abc"])).await.unwrap();
        assert_eq!(out, "1177112959");

        let out = run_cli(&parse(&["clientprint", "hash", "hello", "--seed", "0"]))
            .await
            .unwrap();
        assert_eq!(out, "613153351");
    }

    #[tokio::test]
    async fn test_custom_command() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.json");
        let cli = parse(&[
            "clientprint",
            "--settings",
            settings.to_str().unwrap(),
            "custom",
            "custom",
            "fingerprint",
        ]);
        assert_eq!(run_cli(&cli).await.unwrap(), "166029777");
    }

    #[tokio::test]
    async fn test_ctph_and_compare() {
        let out = run_cli(&parse(&["clientprint", "ctph", "abc"])).await.unwrap();
        assert_eq!(out, "A:uG:uG");

        let cli = parse(&["clientprint", "compare", "A:FJKKIUKact:FHIGi", "A:FJKKIUKacm:FHIGB"]);
        assert_eq!(run_cli(&cli).await.unwrap(), "90.00");

        let cli = parse(&["clientprint", "compare", "garbage", "A:FJKKIUKacm:FHIGB"]);
        assert!(run_cli(&cli).await.is_err());
    }

    #[tokio::test]
    async fn test_match_command() {
        let dir = tempfile::tempdir().unwrap();
        let known = dir.path().join("known.json");
        fs::write(&known, r#"{"alice":"A:FJKKIUKacm:FHIGB","bob":"A:zzzzzzzzzz:zzzz"}"#).unwrap();
        let known = known.to_str().unwrap();
        let settings = dir.path().join("settings.json");
        let settings = settings.to_str().unwrap();

        let cli = parse(&[
            "clientprint",
            "--settings",
            settings,
            "match",
            "A:FJKKIUKact:FHIGi",
            "--known",
            known,
        ]);
        assert_eq!(run_cli(&cli).await.unwrap(), "alice 90.00");

        let cli = parse(&[
            "clientprint",
            "match",
            "A:FJKKIUKact:FHIGi",
            "--known",
            known,
            "--threshold",
            "95",
        ]);
        assert_eq!(run_cli(&cli).await.unwrap(), "No match at or above 95.00");
    }

    #[tokio::test]
    async fn test_settings_init_and_show() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clientprint").join("settings.json");
        let path_arg = path.to_str().unwrap();

        let init = parse(&["clientprint", "--settings", path_arg, "settings", "init"]);
        run_cli(&init).await.unwrap();
        assert!(path.exists());
        assert!(run_cli(&init).await.is_err());

        let force = parse(&["clientprint", "--settings", path_arg, "settings", "init", "--force"]);
        run_cli(&force).await.unwrap();

        let show = parse(&["clientprint", "--settings", path_arg, "settings", "show"]);
        let json: serde_json::Value = serde_json::from_str(&run_cli(&show).await.unwrap()).unwrap();
        assert_eq!(json["seed"], 256);
        assert_eq!(json["capabilities"]["flash"], true);
    }

    #[tokio::test]
    async fn test_fingerprint_and_digest_commands() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.json");
        let profile = dir.path().join("client.json");
        fs::write(
            &profile,
            r#"{
                "getUserAgent": "UA1",
                "getScreenPrint": "1920x1080",
                "getPlugins": "",
                "getFonts": "Arial",
                "hasLocalStorage": true,
                "hasSessionStorage": true,
                "getTimeZone": "GMT-0500",
                "getLanguage": "en-US",
                "getSystemLanguage": "en-US",
                "hasCookies": true,
                "getCanvasPrint": "data:...",
                "asyncFailures": ["getIPs"]
            }"#,
        )
        .unwrap();
        let settings = settings.to_str().unwrap();
        let profile = profile.to_str().unwrap();

        let cli = parse(&["clientprint", "--settings", settings, "fingerprint", "--profile", profile]);
        assert_eq!(run_cli(&cli).await.unwrap(), "2070457555");

        let cli = parse(&[
            "clientprint",
            "--settings",
            settings,
            "digest",
            "--profile",
            profile,
            "--set",
            "getIPs=true",
        ]);
        let json: serde_json::Value = serde_json::from_str(&run_cli(&cli).await.unwrap()).unwrap();
        assert!(json["digest"].as_str().unwrap().contains(':'));
        assert!(json["datapoints"].get("getIPs").is_none());
        assert_eq!(json["datapoints"]["getLanguage"], "en-US");
        assert!(json["datapoints"]["getDevice"].is_null());
    }
}
