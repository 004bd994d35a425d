//! Clientprint Core Library
//!
//! Client fingerprints built from observable client signals.
//!
//! # Features
//!
//! - **Exact Fingerprint**: 32-bit MurmurHash3 of eleven fixed signals
//! - **Custom Fingerprint**: the same hash over caller-chosen values
//! - **Extended Fingerprint**: context-triggered piecewise hash over every enabled
//!   signal, comparable with a 0-100 similarity score
//! - **Matching**: threshold-based lookup of a digest among known clients
//! - **Configuration**: persistent option overrides and build capabilities
//!
//! # Module Structure
//!
//! - `hash/` - MurmurHash3 and the fuzzy digest
//! - `signals/` - signal names, datapoints, collectors, key assembly
//! - `orchestrator` - collection order and fingerprint computation
//!
//! # Example
//!
//! ```
//! use cp_core::{compute_fingerprint, digest_str, similarity};
//!
//! let a = compute_fingerprint(["custom", "fingerprint"]);
//! let b = compute_fingerprint(["custom", "fingerprint :)"]);
//! assert_ne!(a, b);
//!
//! let d1 = digest_str("The quick brown fox jumps over the lazy dog");
//! let d2 = digest_str("The quick brown fox jumps over the lazy cog");
//! assert!(similarity(&d1, &d2) > 80.0);
//! ```

// Grouped modules
pub mod hash;
pub mod signals;

// Standalone modules
pub mod constants;
pub mod matcher;
pub mod orchestrator;
pub mod settings;

// Re-export error types
pub use cp_error::{ClientprintError, Result};

// Re-export hashing
pub use hash::{digest, digest_str, hash32, hash32_str, similarity, try_similarity, FuzzyDigest};

// Re-export signal types
pub use signals::{
    Capabilities, CollectorRegistry, Datapoint, Datapoints, KeyBuilder, ScreenMetrics, Signal,
};

// Re-export formatters
pub use signals::{
    available_resolution, current_resolution, font_list, plugin_list, screen_print,
};

// Re-export orchestration
pub use orchestrator::{
    compute_fingerprint, compute_fingerprint_with_seed, compute_fuzzy_fingerprint, Fingerprinter,
    FuzzyFingerprint,
};

// Re-export matching
pub use matcher::{FingerprintMatcher, MatchResult};

// Re-export settings
pub use settings::{
    get_settings_path, load_settings, load_settings_from, save_settings_to, FingerprintOptions,
    OptionOverrides, Settings,
};
