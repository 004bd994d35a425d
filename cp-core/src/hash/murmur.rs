//! MurmurHash3, 32-bit x86 variant
//!
//! Exact fingerprints are this hash of the assembled key with a fixed seed. The
//! function is total: any byte sequence and any seed produce a value, the empty
//! key included.

use crate::constants::exact::{C1, C2, FMIX_1, FMIX_2, MIX_ADD};

/// Hash a byte key with the given seed
pub fn hash32(key: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;

    let mut blocks = key.chunks_exact(4);
    for block in &mut blocks {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= scramble(k1);
        h1 = h1.rotate_left(13).wrapping_mul(5).wrapping_add(MIX_ADD);
    }

    // Tail bytes are folded in without the rotate/mix-add step
    let tail = blocks.remainder();
    if !tail.is_empty() {
        let k1 = tail
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &b)| acc | (u32::from(b) << (8 * i)));
        h1 ^= scramble(k1);
    }

    h1 ^= key.len() as u32;
    fmix(h1)
}

/// Hash a text key the way browser-side fingerprints were computed
///
/// Each UTF-16 code unit contributes only its low byte and the length is counted
/// in code units. Non-Latin1 text therefore collides with its truncated form;
/// this is kept so fingerprints stay comparable with previously stored values.
pub fn hash32_str(key: &str, seed: u32) -> u32 {
    let units: Vec<u8> = key.encode_utf16().map(|unit| (unit & 0xff) as u8).collect();
    hash32(&units, seed)
}

#[inline]
fn scramble(k1: u32) -> u32 {
    k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline]
fn fmix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(FMIX_1);
    h ^= h >> 13;
    h = h.wrapping_mul(FMIX_2);
    h ^= h >> 16;
    h
}
