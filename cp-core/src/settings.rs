//! Fingerprint options and persistent settings
//!
//! Options decide which signals feed the extended fingerprint. Settings are
//! stored as JSON in ~/.config/clientprint/settings.json and carry option
//! overrides, the build capabilities, the font probe list and matching tuning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{exact, fonts, limits, matching, paths};
use crate::signals::{Capabilities, Signal};
use cp_error::{ClientprintError, Result};

// ============================================================================
// Options
// ============================================================================

/// Caller-supplied overrides, keyed by collector name
///
/// Names are validated when the overrides are applied, not when they are read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionOverrides(BTreeMap<String, bool>);

impl OptionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, enabled: bool) {
        self.0.insert(name.into(), enabled);
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.set(name, enabled);
        self
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Inclusion flag for every signal of the extended fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintOptions {
    flags: BTreeMap<Signal, bool>,
}

impl FingerprintOptions {
    pub fn is_enabled(&self, signal: Signal) -> bool {
        self.flags.get(&signal).copied().unwrap_or(false)
    }

    pub fn set(&mut self, signal: Signal, enabled: bool) {
        self.flags.insert(signal, enabled);
    }

    /// Shallow override: every listed name replaces the base value, unlisted
    /// signals keep theirs. Unknown names fail with `UnknownSignal`.
    pub fn merged(&self, overrides: &OptionOverrides) -> Result<FingerprintOptions> {
        let mut merged = self.clone();
        for (name, enabled) in overrides.iter() {
            let signal: Signal = name.parse()?;
            merged.set(signal, enabled);
        }
        Ok(merged)
    }

    /// Enabled signals in collection order
    pub fn enabled(&self) -> impl Iterator<Item = Signal> + '_ {
        self.flags
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(signal, _)| *signal)
    }
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            flags: Signal::ALL
                .iter()
                .map(|signal| (*signal, signal.enabled_by_default()))
                .collect(),
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Persistent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Overrides applied on top of the default options
    #[serde(default)]
    pub options: OptionOverrides,

    /// Optional collectors carried by this build
    #[serde(default)]
    pub capabilities: Capabilities,

    /// Font candidates to probe; the stock list when absent
    #[serde(default)]
    pub fonts: Option<Vec<String>>,

    /// Seed of the exact fingerprint
    #[serde(default = "default_seed")]
    pub seed: u32,

    /// Minimum similarity (0-100) for a fuzzy match
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
}

fn default_seed() -> u32 {
    exact::DEFAULT_SEED
}

fn default_match_threshold() -> f64 {
    matching::DEFAULT_MATCH_THRESHOLD
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            options: OptionOverrides::default(),
            capabilities: Capabilities::default(),
            fonts: None,
            seed: default_seed(),
            match_threshold: default_match_threshold(),
        }
    }
}

impl Settings {
    /// Default options with the stored overrides applied
    pub fn fingerprint_options(&self) -> Result<FingerprintOptions> {
        FingerprintOptions::default().merged(&self.options)
    }

    /// Font candidates in probe order
    pub fn font_candidates(&self) -> Vec<String> {
        match &self.fonts {
            Some(list) => list.clone(),
            None => fonts::DEFAULT_FONTS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Reject values that would make fingerprints meaningless
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.match_threshold) {
            return Err(ClientprintError::invalid_config(
                "match_threshold",
                format!("{} is outside 0-100", self.match_threshold),
            ));
        }
        self.fingerprint_options().map(|_| ())
    }
}

/// Default settings file path
pub fn get_settings_path() -> Result<PathBuf> {
    paths::user_config_dir()
        .map(|dir| dir.join(paths::SETTINGS_FILE))
        .ok_or_else(|| ClientprintError::config("Could not determine config directory"))
}

/// Load settings from the default path
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

/// Load settings from `path`; a missing file yields defaults
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(Settings::default());
    }

    let metadata = fs::metadata(path).map_err(|source| ClientprintError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() > limits::MAX_SETTINGS_FILE_SIZE {
        return Err(ClientprintError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: limits::MAX_SETTINGS_FILE_SIZE,
        });
    }

    let content = fs::read_to_string(path).map_err(|source| ClientprintError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = serde_json::from_str(&content)?;
    settings.validate()?;

    info!(
        path = %path.display(),
        overrides = settings.options.iter().count(),
        build = settings.capabilities.build_name(),
        "Loaded settings"
    );
    Ok(settings)
}

/// Write settings to `path` as pretty JSON, creating parent directories
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    settings.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ClientprintError::FileWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).map_err(|source| ClientprintError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "Saved settings");
    Ok(())
}
