//! Context-Triggered Piecewise Hashing
//!
//! Produces digests of the form `<block>:<signature>:<double signature>` whose
//! characters each summarise one variable-length chunk of the input. Chunk
//! boundaries are chosen by a rolling checksum over a 7-byte window, so an edit
//! only disturbs the chunks that touch it and two nearly equal inputs yield
//! nearly equal signatures.
//!
//! # Block size
//!
//! The initial exponent aims for about 64 chunks per signature and never goes
//! below 3. If the first signature ends up shorter than 32 characters the block
//! size is halved and the input re-hashed, down to exponent 0.
//!
//! # Comparison
//!
//! Digests whose block exponents differ by more than one are not comparable.
//! Equal exponents compare their first signatures; adjacent exponents compare
//! the finer digest's double signature with the coarser digest's first one.
//! The score is the normalised Levenshtein distance scaled to 0-100.

use std::fmt;
use std::str::FromStr;

use cp_error::{ClientprintError, Result};
use tracing::trace;

use crate::constants::ctph::{
    ALPHABET, CHUNKS_PER_SIGNATURE, FIELD_SEPARATOR, HASH_INIT, HASH_PRIME, MAX_BLOCK_EXPONENT,
    MAX_COMPARED_SIGNATURE_LEN, MIN_BLOCK_EXPONENT, MIN_BLOCK_SIZE, MIN_SIGNATURE_LEN,
    ROLLING_WINDOW,
};

// ============================================================================
// Rolling hash
// ============================================================================

/// Rolling checksum over the last `ROLLING_WINDOW` bytes
#[derive(Debug, Default)]
struct RollingHash {
    /// Sum of the bytes in the window
    x: u32,
    /// Position-weighted sum of the bytes in the window
    y: u32,
    /// Shift/xor accumulator
    z: u32,
    count: usize,
    window: [u8; ROLLING_WINDOW],
}

impl RollingHash {
    fn update(&mut self, d: u8) {
        let slot = self.count % ROLLING_WINDOW;
        let d = u32::from(d);

        self.y = self.y.wrapping_sub(self.x).wrapping_add(7 * d);
        self.x = self
            .x
            .wrapping_add(d)
            .wrapping_sub(u32::from(self.window[slot]));
        self.window[slot] = d as u8;
        self.count += 1;
        self.z = (self.z << 5) ^ d;
    }

    fn sum(&self) -> u32 {
        self.x.wrapping_add(self.y).wrapping_add(self.z)
    }
}

#[inline]
fn fnv(h: u32, b: u8) -> u32 {
    h.wrapping_mul(HASH_PRIME) ^ u32::from(b)
}

#[inline]
fn alphabet_char(index: u32) -> char {
    char::from(ALPHABET[(index & 63) as usize])
}

fn alphabet_index(c: char) -> Option<u32> {
    ALPHABET.iter().position(|&a| char::from(a) == c).map(|i| i as u32)
}

// ============================================================================
// Digest computation
// ============================================================================

/// Hash `bytes` in chunks, emitting one character per chunk at `trigger` and
/// one per chunk at `2 * trigger`. The final byte always closes both chunks.
fn piecewise_hash(bytes: &[u8], trigger: u64) -> (String, String) {
    let double = trigger * 2;
    let mut first = String::new();
    let mut second = String::new();
    let mut h1 = HASH_INIT;
    let mut h2 = HASH_INIT;
    let mut roll = RollingHash::default();

    let last = bytes.len().saturating_sub(1);
    for (i, &b) in bytes.iter().enumerate() {
        h1 = fnv(h1, b);
        h2 = fnv(h2, b);
        roll.update(b);

        let sum = u64::from(roll.sum());
        if i == last || sum % trigger == trigger - 1 {
            first.push(alphabet_char(h1));
            h1 = HASH_INIT;
        }
        if i == last || sum % double == double - 1 {
            second.push(alphabet_char(h2));
            h2 = HASH_INIT;
        }
    }

    (first, second)
}

/// Initial block-size exponent for an input of `len` bytes
///
/// An empty input is treated as one byte long so the logarithm stays finite.
pub fn initial_block_exponent(len: usize) -> u32 {
    let chunks = len.max(1) as f64 / (CHUNKS_PER_SIGNATURE * MIN_BLOCK_SIZE as f64);
    let exponent = chunks.log2().ceil();
    if exponent > f64::from(MIN_BLOCK_EXPONENT) {
        exponent as u32
    } else {
        MIN_BLOCK_EXPONENT
    }
}

/// Trigger value (block size) for a block exponent
///
/// `exponent` must not exceed `MAX_BLOCK_EXPONENT`; parsed and computed digests
/// never do.
pub fn block_size(exponent: u32) -> u64 {
    MIN_BLOCK_SIZE << exponent
}

/// A parsed or freshly computed fuzzy digest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuzzyDigest {
    block_index: u32,
    signature: String,
    double_signature: String,
}

impl FuzzyDigest {
    /// Compute the digest of a byte sequence
    pub fn compute(bytes: &[u8]) -> Self {
        let mut exponent = initial_block_exponent(bytes.len());
        let (mut signature, mut double_signature) = piecewise_hash(bytes, block_size(exponent));

        while exponent > 0 && signature.len() < MIN_SIGNATURE_LEN {
            exponent -= 1;
            (signature, double_signature) = piecewise_hash(bytes, block_size(exponent));
        }

        trace!(
            len = bytes.len(),
            exponent,
            signature_len = signature.len(),
            "Computed fuzzy digest"
        );

        Self {
            block_index: exponent,
            signature,
            double_signature,
        }
    }

    /// Block-size exponent encoded by the leading character
    pub fn block_index(&self) -> u32 {
        self.block_index
    }

    /// Trigger value the first signature was produced with
    pub fn block_size(&self) -> u64 {
        block_size(self.block_index)
    }

    /// Signature at the digest's block size
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Similarity score in `0.0..=100.0`, symmetric in its arguments
    pub fn similarity(&self, other: &FuzzyDigest) -> f64 {
        let (fine, coarse) = if self.block_index <= other.block_index {
            (self, other)
        } else {
            (other, self)
        };

        match coarse.block_index - fine.block_index {
            0 => match_score(&fine.signature, &coarse.signature),
            1 => match_score(&fine.double_signature, &coarse.signature),
            _ => 0.0,
        }
    }
}

impl fmt::Display for FuzzyDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            alphabet_char(self.block_index),
            self.signature,
            self.double_signature,
            sep = FIELD_SEPARATOR
        )
    }
}

impl FromStr for FuzzyDigest {
    type Err = ClientprintError;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s.split(FIELD_SEPARATOR);
        let (Some(block), Some(signature), Some(double_signature), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(ClientprintError::invalid_digest(format!(
                "expected three ':'-separated fields in {:?}",
                s
            )));
        };

        let mut block_chars = block.chars();
        let block_index = match (block_chars.next(), block_chars.next()) {
            (Some(c), None) => alphabet_index(c).ok_or_else(|| {
                ClientprintError::invalid_digest(format!("unknown block-size character {:?}", c))
            })?,
            _ => {
                return Err(ClientprintError::invalid_digest(format!(
                    "block-size field must be one character, got {:?}",
                    block
                )))
            }
        };
        if block_index > MAX_BLOCK_EXPONENT {
            return Err(ClientprintError::invalid_digest(format!(
                "block-size index {} is out of range",
                block_index
            )));
        }

        for sig in [signature, double_signature] {
            if let Some(c) = sig.chars().find(|&c| alphabet_index(c).is_none()) {
                return Err(ClientprintError::invalid_digest(format!(
                    "unexpected character {:?} in signature",
                    c
                )));
            }
        }

        Ok(Self {
            block_index,
            signature: signature.to_string(),
            double_signature: double_signature.to_string(),
        })
    }
}

/// Digest a byte sequence into `<block>:<signature>:<double signature>`
pub fn digest(bytes: &[u8]) -> String {
    FuzzyDigest::compute(bytes).to_string()
}

/// Digest the UTF-8 encoding of `text`
pub fn digest_str(text: &str) -> String {
    digest(text.as_bytes())
}

/// Compare two digest strings, returning a score in `0.0..=100.0`
///
/// Strings that are not well-formed digests are not comparable with anything
/// and score 0. Use [`try_similarity`] to surface the parse error instead.
pub fn similarity(a: &str, b: &str) -> f64 {
    try_similarity(a, b).unwrap_or(0.0)
}

/// Compare two digest strings, failing on malformed input
pub fn try_similarity(a: &str, b: &str) -> Result<f64> {
    let a: FuzzyDigest = a.parse()?;
    let b: FuzzyDigest = b.parse()?;
    Ok(a.similarity(&b))
}

// ============================================================================
// Edit distance
// ============================================================================

/// Normalised edit distance of two signatures, on at most
/// `MAX_COMPARED_SIGNATURE_LEN` leading characters of each
fn match_score(s1: &str, s2: &str) -> f64 {
    let s1 = &s1.as_bytes()[..s1.len().min(MAX_COMPARED_SIGNATURE_LEN)];
    let s2 = &s2.as_bytes()[..s2.len().min(MAX_COMPARED_SIGNATURE_LEN)];
    let longest = s1.len().max(s2.len());
    if longest == 0 {
        return 100.0;
    }
    let distance = levenshtein(s1, s2);
    (1.0 - distance as f64 / longest as f64) * 100.0
}

/// Two-row Levenshtein distance
fn levenshtein(a: &[u8], b: &[u8]) -> usize {
    if a == b {
        return 0;
    }
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let insertion = cur[j] + 1;
            let deletion = prev[j + 1] + 1;
            cur[j + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[b.len()]
}
