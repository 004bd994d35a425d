//! Signal profiles
//!
//! A profile is a JSON snapshot of what a client reported, used to drive the
//! fingerprinter from the command line. Collector names map directly to values:
//!
//! ```json
//! {
//!   "getUserAgent": "Mozilla/5.0 ...",
//!   "getLanguage": "en-US",
//!   "hasCookies": true,
//!   "screen": { "width": 1920, "height": 1080, "availWidth": 1920,
//!               "availHeight": 1053, "colorDepth": 24 },
//!   "plugins": ["PDF Viewer"],
//!   "installedFonts": ["Arial", "Verdana"],
//!   "asyncFailures": ["getMediaDevices"]
//! }
//! ```
//!
//! `screen`, `plugins`, `mimeTypes` and `installedFonts` are raw observations
//! rendered through the stock formatters. An explicit collector entry wins over
//! a rendered one. Synchronous signals the profile does not mention report
//! `undefined`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use cp_core::constants::limits::MAX_PROFILE_FILE_SIZE;
use cp_core::signals::{
    available_resolution, current_resolution, font_list, plugin_list, screen_print,
};
use cp_core::{CollectorRegistry, Datapoint, ScreenMetrics, Signal};
use cp_error::{ClientprintError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client snapshot read from a profile file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenMetrics>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_types: Option<Vec<String>>,

    /// Fonts present on the client; probed against the configured candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_fonts: Option<Vec<String>>,

    /// Async collectors that report failure instead of a value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub async_failures: Vec<String>,

    /// Collector name to reported value
    #[serde(flatten)]
    pub signals: BTreeMap<String, Datapoint>,
}

impl Profile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Value every collector reports for this profile
    ///
    /// Async signals only appear when the profile names them.
    pub fn resolve(&self, font_candidates: &[String]) -> Result<BTreeMap<Signal, Datapoint>> {
        let mut values: BTreeMap<Signal, Datapoint> = Signal::ALL
            .iter()
            .filter(|signal| !signal.is_async())
            .map(|signal| (*signal, Datapoint::Undefined))
            .collect();

        if let Some(screen) = &self.screen {
            values.insert(Signal::ScreenPrint, screen_print(screen).into());
            values.insert(Signal::ColorDepth, screen.color_depth.into());
            values.insert(Signal::CurrentResolution, current_resolution(screen).into());
            values.insert(Signal::AvailableResolution, available_resolution(screen).into());
            values.insert(Signal::DeviceXDpi, screen.device_xdpi.into());
            values.insert(Signal::DeviceYDpi, screen.device_ydpi.into());
        }
        if let Some(plugins) = &self.plugins {
            values.insert(Signal::Plugins, plugin_list(plugins).into());
        }
        if let Some(mime_types) = &self.mime_types {
            values.insert(Signal::MimeTypes, plugin_list(mime_types).into());
        }
        if let Some(installed) = &self.installed_fonts {
            let installed: HashSet<&str> = installed.iter().map(String::as_str).collect();
            let fonts = font_list(font_candidates, |font| installed.contains(font));
            values.insert(Signal::Fonts, fonts.into());
        }

        for (name, value) in &self.signals {
            let signal: Signal = name.parse()?;
            values.insert(signal, value.clone());
        }

        Ok(values)
    }

    /// Collectors replaying this profile
    pub fn registry(&self, font_candidates: &[String]) -> Result<CollectorRegistry> {
        let mut registry = CollectorRegistry::new();

        for (signal, value) in self.resolve(font_candidates)? {
            if signal.is_async() {
                registry.register_async(signal, move || {
                    let value = value.clone();
                    async move { Ok::<_, ClientprintError>(Some(value)) }
                });
            } else {
                registry.register(signal, move || Ok(value.clone()));
            }
        }

        for name in &self.async_failures {
            let signal: Signal = name.parse()?;
            if !signal.is_async() {
                return Err(ClientprintError::invalid_config(
                    "asyncFailures",
                    format!("{} is not an asynchronous collector", signal),
                ));
            }
            let signal_name = signal.as_str();
            registry.register_async(signal, move || async move {
                let err = ClientprintError::collector_failed(signal_name, "reported failure");
                Err::<Option<Datapoint>, _>(err)
            });
        }

        debug!(registry = ?registry, "Built collectors from profile");
        Ok(registry)
    }
}

/// Read a profile from `path`
pub fn load_profile(path: &Path) -> Result<Profile> {
    let metadata = fs::metadata(path).map_err(|source| ClientprintError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() > MAX_PROFILE_FILE_SIZE {
        return Err(ClientprintError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_PROFILE_FILE_SIZE,
        });
    }

    let content = fs::read_to_string(path).map_err(|source| ClientprintError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Profile::from_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<String> {
        ["Arial", "Courier", "Verdana"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collector_names_map_to_values() {
        let profile = Profile::from_json(
            r#"{"getUserAgent":"UA1","hasCookies":true,"getColorDepth":24,"getDevice":null}"#,
        )
        .unwrap();
        let values = profile.resolve(&candidates()).unwrap();

        assert_eq!(values[&Signal::UserAgent], Datapoint::from("UA1"));
        assert_eq!(values[&Signal::Cookies], Datapoint::from(true));
        assert_eq!(values[&Signal::ColorDepth].to_string(), "24");
        assert!(values[&Signal::Device].is_undefined());
        assert!(values[&Signal::Language].is_undefined());
        assert!(!values.contains_key(&Signal::LocalIps));
    }

    #[test]
    fn test_raw_observations_are_rendered() {
        let profile = Profile::from_json(
            r#"{
                "screen": {"width":1920,"height":1080,"availWidth":1920,"availHeight":1053,"colorDepth":24},
                "plugins": ["PDF Viewer", "Chrome PDF Viewer"],
                "installedFonts": ["Verdana", "Arial"]
            }"#,
        )
        .unwrap();
        let values = profile.resolve(&candidates()).unwrap();

        assert_eq!(values[&Signal::CurrentResolution].to_string(), "1920x1080");
        assert_eq!(values[&Signal::AvailableResolution].to_string(), "1920x1053");
        assert_eq!(
            values[&Signal::ScreenPrint].to_string(),
            "Current Resolution: 1920x1080, Available Resolution: 1920x1053, Color Depth: 24, Device XDPI: undefined, Device YDPI: undefined"
        );
        assert_eq!(values[&Signal::Plugins].to_string(), "PDF Viewer, Chrome PDF Viewer");
        // Verdana is the final candidate, so no trailing separator
        assert_eq!(values[&Signal::Fonts].to_string(), "Arial, Verdana");
    }

    #[test]
    fn test_explicit_entry_wins() {
        let profile = Profile::from_json(r#"{"plugins":["PDF Viewer"],"getPlugins":"Flash"}"#).unwrap();
        let values = profile.resolve(&candidates()).unwrap();
        assert_eq!(values[&Signal::Plugins], Datapoint::from("Flash"));
    }

    #[test]
    fn test_unknown_collector_rejected() {
        let profile = Profile::from_json(r#"{"getShoeSize":"42"}"#).unwrap();
        assert!(matches!(
            profile.resolve(&candidates()),
            Err(ClientprintError::UnknownSignal(_))
        ));
    }

    #[test]
    fn test_async_failure_must_name_async_collector() {
        let profile = Profile::from_json(r#"{"asyncFailures":["getLanguage"]}"#).unwrap();
        assert!(matches!(
            profile.registry(&candidates()),
            Err(ClientprintError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_registry_replays_profile() {
        let profile = Profile::from_json(
            r#"{"getLanguage":"en-US","getIPs":"10.0.0.2","asyncFailures":["getMediaDevices"]}"#,
        )
        .unwrap();
        let registry = profile.registry(&candidates()).unwrap();

        assert_eq!(registry.collect(Signal::Language).unwrap(), Datapoint::from("en-US"));
        assert_eq!(
            registry.collect_async(Signal::LocalIps).await.unwrap(),
            Some(Datapoint::from("10.0.0.2"))
        );
        assert!(registry.collect_async(Signal::MediaDevices).await.is_err());
    }

    #[test]
    fn test_load_profile_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        fs::write(&path, r#"{"getUserAgent":"UA1"}"#).unwrap();

        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.signals.get("getUserAgent"), Some(&Datapoint::from("UA1")));

        assert!(matches!(
            load_profile(&dir.path().join("missing.json")),
            Err(ClientprintError::FileRead { .. })
        ));
    }
}
