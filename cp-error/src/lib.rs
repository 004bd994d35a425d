//! Unified error handling for clientprint
//!
//! A single error type shared by the core library and the command-line front end.
//! The hash and digest functions are total and never produce one of these; errors
//! come from configuration, collectors and digest parsing.

use std::io;
use std::path::PathBuf;

/// Result type alias using ClientprintError
pub type Result<T> = std::result::Result<T, ClientprintError>;

/// Unified error type for all clientprint operations
#[derive(thiserror::Error, Debug)]
pub enum ClientprintError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Unknown signal name: {0}")]
    UnknownSignal(String),

    // ============================================================================
    // Collector Errors
    // ============================================================================
    #[error("No collector registered for {0}")]
    CollectorMissing(String),

    #[error("Collector {signal} failed: {reason}")]
    CollectorFailed {
        signal: String,
        reason: String,
    },

    #[error("{signal} is not available in the {build} build")]
    CapabilityDisabled {
        signal: String,
        build: String,
    },

    // ============================================================================
    // Digest Errors
    // ============================================================================
    #[error("Invalid fuzzy digest: {0}")]
    InvalidDigest(String),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl ClientprintError {
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid config error for a named field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a collector failure for the named signal
    pub fn collector_failed(signal: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CollectorFailed {
            signal: signal.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid digest error
    pub fn invalid_digest(msg: impl Into<String>) -> Self {
        Self::InvalidDigest(msg.into())
    }
}

// Allow converting from String to ClientprintError
impl From<String> for ClientprintError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to ClientprintError
impl From<&str> for ClientprintError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
