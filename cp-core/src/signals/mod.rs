//! Client signals and their values
//!
//! A [`Signal`] names one observable property of a client (user agent, screen,
//! fonts, ...). Collectors are external; the core only fixes the order in which
//! signals are read and how each [`Datapoint`] is rendered into the key.
//!
//! # Stability
//!
//! The declaration order of [`Signal`] is the collection order of the extended
//! (fuzzy) fingerprint. Reordering variants changes every fuzzy digest.

pub mod collectors;
pub mod format;
pub mod key;

use std::fmt;
use std::str::FromStr;

use cp_error::ClientprintError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::key::UNDEFINED;

pub use collectors::{AsyncCollectorFn, Capabilities, CollectorFn, CollectorFuture, CollectorRegistry};
pub use format::{
    available_resolution, current_resolution, font_list, plugin_list, screen_print, ScreenMetrics,
};
pub use key::{joined_key, terminated_key, KeyBuilder};

// ============================================================================
// Signal names
// ============================================================================

/// A named client signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    // Permission-gated, resolved asynchronously before everything else
    LocalIps,
    MediaDevices,

    // User agent and its classification
    UserAgent,
    Browser,
    BrowserVersion,
    Engine,
    EngineVersion,
    Os,
    OsVersion,
    Device,
    DeviceType,
    DeviceVendor,
    Cpu,
    Mobile,

    // Screen
    ScreenPrint,
    ColorDepth,
    CurrentResolution,
    AvailableResolution,
    DeviceXDpi,
    DeviceYDpi,

    // Plugins and fonts
    Plugins,
    MimeTypes,
    Fonts,

    // Storage
    LocalStorage,
    SessionStorage,
    Cookies,

    // Locale
    TimeZone,
    Language,
    SystemLanguage,

    // Rendering
    CanvasPrint,

    // Only present in builds that carry the matching capability
    JavaVersion,
    FlashVersion,
}

impl Signal {
    /// Every signal, in collection order
    pub const ALL: [Signal; 32] = [
        Signal::LocalIps,
        Signal::MediaDevices,
        Signal::UserAgent,
        Signal::Browser,
        Signal::BrowserVersion,
        Signal::Engine,
        Signal::EngineVersion,
        Signal::Os,
        Signal::OsVersion,
        Signal::Device,
        Signal::DeviceType,
        Signal::DeviceVendor,
        Signal::Cpu,
        Signal::Mobile,
        Signal::ScreenPrint,
        Signal::ColorDepth,
        Signal::CurrentResolution,
        Signal::AvailableResolution,
        Signal::DeviceXDpi,
        Signal::DeviceYDpi,
        Signal::Plugins,
        Signal::MimeTypes,
        Signal::Fonts,
        Signal::LocalStorage,
        Signal::SessionStorage,
        Signal::Cookies,
        Signal::TimeZone,
        Signal::Language,
        Signal::SystemLanguage,
        Signal::CanvasPrint,
        Signal::JavaVersion,
        Signal::FlashVersion,
    ];

    /// Signals of the exact fingerprint, in key order
    pub const EXACT: [Signal; 11] = [
        Signal::UserAgent,
        Signal::ScreenPrint,
        Signal::Plugins,
        Signal::Fonts,
        Signal::LocalStorage,
        Signal::SessionStorage,
        Signal::TimeZone,
        Signal::Language,
        Signal::SystemLanguage,
        Signal::Cookies,
        Signal::CanvasPrint,
    ];

    /// Collector name, as used in option maps and profiles
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::LocalIps => "getIPs",
            Signal::MediaDevices => "getMediaDevices",
            Signal::UserAgent => "getUserAgent",
            Signal::Browser => "getBrowser",
            Signal::BrowserVersion => "getBrowserVersion",
            Signal::Engine => "getEngine",
            Signal::EngineVersion => "getEngineVersion",
            Signal::Os => "getOS",
            Signal::OsVersion => "getOSVersion",
            Signal::Device => "getDevice",
            Signal::DeviceType => "getDeviceType",
            Signal::DeviceVendor => "getDeviceVendor",
            Signal::Cpu => "getCPU",
            Signal::Mobile => "isMobile",
            Signal::ScreenPrint => "getScreenPrint",
            Signal::ColorDepth => "getColorDepth",
            Signal::CurrentResolution => "getCurrentResolution",
            Signal::AvailableResolution => "getAvailableResolution",
            Signal::DeviceXDpi => "getDeviceXDPI",
            Signal::DeviceYDpi => "getDeviceYDPI",
            Signal::Plugins => "getPlugins",
            Signal::MimeTypes => "getMimeTypes",
            Signal::Fonts => "getFonts",
            Signal::LocalStorage => "hasLocalStorage",
            Signal::SessionStorage => "hasSessionStorage",
            Signal::Cookies => "hasCookies",
            Signal::TimeZone => "getTimeZone",
            Signal::Language => "getLanguage",
            Signal::SystemLanguage => "getSystemLanguage",
            Signal::CanvasPrint => "getCanvasPrint",
            Signal::JavaVersion => "getJavaVersion",
            Signal::FlashVersion => "getFlashVersion",
        }
    }

    /// Whether the collector is permission-gated and resolved asynchronously
    pub fn is_async(&self) -> bool {
        matches!(self, Signal::LocalIps | Signal::MediaDevices)
    }

    /// Whether the collector only exists in builds with an extra capability
    pub fn is_optional(&self) -> bool {
        matches!(self, Signal::JavaVersion | Signal::FlashVersion)
    }

    /// Inclusion in the extended fingerprint when no override is given
    pub fn enabled_by_default(&self) -> bool {
        !self.is_async() && !self.is_optional()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = ClientprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signal::ALL
            .iter()
            .copied()
            .find(|signal| signal.as_str() == s)
            .ok_or_else(|| ClientprintError::UnknownSignal(s.to_string()))
    }
}

// ============================================================================
// Datapoint values
// ============================================================================

/// Value produced by a collector
///
/// Rendering follows the conventions the key format was defined with: booleans
/// as `true`/`false`, integral numbers without a fraction, and a missing value
/// as `undefined`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datapoint {
    Flag(bool),
    Number(f64),
    Text(String),
    Undefined,
}

impl Datapoint {
    /// True for a collector that produced no value
    pub fn is_undefined(&self) -> bool {
        matches!(self, Datapoint::Undefined)
    }
}

impl fmt::Display for Datapoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datapoint::Text(s) => f.write_str(s),
            Datapoint::Flag(b) => write!(f, "{}", b),
            Datapoint::Number(n) => format_number(*n, f),
            Datapoint::Undefined => f.write_str(UNDEFINED),
        }
    }
}

fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // -0 renders as 0
        f.write_str("0")
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form, with an explicit sign on positive exponents
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                write!(f, "{}e+{}", mantissa, exponent)
            }
            _ => f.write_str(&text),
        }
    } else {
        write!(f, "{}", n)
    }
}

impl From<&str> for Datapoint {
    fn from(s: &str) -> Self {
        Datapoint::Text(s.to_string())
    }
}

impl From<String> for Datapoint {
    fn from(s: String) -> Self {
        Datapoint::Text(s)
    }
}

impl From<bool> for Datapoint {
    fn from(b: bool) -> Self {
        Datapoint::Flag(b)
    }
}

impl From<f64> for Datapoint {
    fn from(n: f64) -> Self {
        Datapoint::Number(n)
    }
}

impl From<u32> for Datapoint {
    fn from(n: u32) -> Self {
        Datapoint::Number(f64::from(n))
    }
}

impl From<i32> for Datapoint {
    fn from(n: i32) -> Self {
        Datapoint::Number(f64::from(n))
    }
}

impl<T: Into<Datapoint>> From<Option<T>> for Datapoint {
    fn from(value: Option<T>) -> Self {
        value.map_or(Datapoint::Undefined, Into::into)
    }
}

// ============================================================================
// Collected datapoints
// ============================================================================

/// Datapoints gathered for one fingerprint, in collection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datapoints {
    entries: Vec<(Signal, Datapoint)>,
}

impl Datapoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; a repeated signal replaces the earlier value in place
    pub fn insert(&mut self, signal: Signal, value: Datapoint) {
        match self.entries.iter_mut().find(|(s, _)| *s == signal) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((signal, value)),
        }
    }

    pub fn get(&self, signal: Signal) -> Option<&Datapoint> {
        self.entries
            .iter()
            .find(|(s, _)| *s == signal)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, signal: Signal) -> bool {
        self.get(signal).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Signal, &Datapoint)> {
        self.entries.iter().map(|(s, v)| (*s, v))
    }

    /// Signals in collection order
    pub fn signals(&self) -> impl Iterator<Item = Signal> + '_ {
        self.entries.iter().map(|(s, _)| *s)
    }
}

impl Serialize for Datapoints {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (signal, value) in self.iter() {
            map.serialize_entry(signal.as_str(), value)?;
        }
        map.end()
    }
}
