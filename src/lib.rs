//! Clientprint command-line front end
//!
//! Feeds JSON client profiles into the core fingerprinter.

pub mod cli;
pub mod profile;

pub use profile::{load_profile, Profile};
