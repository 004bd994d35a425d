//! Stock renderings for list and screen signals
//!
//! The text produced here is hashed verbatim, so the layouts (including the font
//! list's separator quirk) are part of the fingerprint format.

use serde::{Deserialize, Serialize};

use super::Datapoint;
use crate::constants::key::LIST_SEPARATOR;

/// Screen geometry reported by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenMetrics {
    pub width: u32,
    pub height: u32,
    pub avail_width: u32,
    pub avail_height: u32,
    pub color_depth: u32,
    /// Only reported by some legacy engines
    #[serde(default)]
    pub device_xdpi: Option<u32>,
    #[serde(default)]
    pub device_ydpi: Option<u32>,
}

/// `WxH` of the full screen
pub fn current_resolution(screen: &ScreenMetrics) -> String {
    format!("{}x{}", screen.width, screen.height)
}

/// `WxH` of the area available to windows
pub fn available_resolution(screen: &ScreenMetrics) -> String {
    format!("{}x{}", screen.avail_width, screen.avail_height)
}

/// One-line screen summary used by both fingerprint layouts
pub fn screen_print(screen: &ScreenMetrics) -> String {
    format!(
        "Current Resolution: {}, Available Resolution: {}, Color Depth: {}, Device XDPI: {}, Device YDPI: {}",
        current_resolution(screen),
        available_resolution(screen),
        screen.color_depth,
        Datapoint::from(screen.device_xdpi),
        Datapoint::from(screen.device_ydpi),
    )
}

/// Plugin (or MIME type) names joined with `", "`
pub fn plugin_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Detected fonts among `candidates`, in candidate order
///
/// Every detected font is followed by `", "` unless it is the final candidate,
/// so the result usually carries a trailing separator.
pub fn font_list<S, F>(candidates: &[S], mut is_installed: F) -> String
where
    S: AsRef<str>,
    F: FnMut(&str) -> bool,
{
    let last = candidates.len().saturating_sub(1);
    let mut out = String::new();
    for (i, font) in candidates.iter().enumerate() {
        let font = font.as_ref();
        if !is_installed(font) {
            continue;
        }
        out.push_str(font);
        if i != last {
            out.push_str(LIST_SEPARATOR);
        }
    }
    out
}
