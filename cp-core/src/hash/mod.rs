//! Hashing primitives
//!
//! - `murmur` - deterministic 32-bit exact hash over a key (MurmurHash3 x86_32)
//! - `ctph` - context-triggered piecewise hash producing similarity-preserving digests

pub mod ctph;
pub mod murmur;

pub use ctph::{digest, digest_str, similarity, try_similarity, FuzzyDigest};
pub use murmur::{hash32, hash32_str};
