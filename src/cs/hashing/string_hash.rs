//! # String Hash Functions
//!
//! Small, deterministic hash functions over string keys, used to drive the hash tables in
//! this module family. All of them work on Unicode code points (`char as u64`) and mask the
//! result down to 31 bits, so the output is always a non-negative integer that fits an `i32`.
//!
//! - [`simple_hash`]: sum of character codes. Cheap and collision-heavy; anagrams collide.
//! - [`polynomial_hash`]: polynomial (rolling) hash with base 257.
//! - [`djb2`]: Dan Bernstein's `h * 33 + c`.
//!
//! Any `Fn(&str) -> u64` is a [`StringHasher`], so plain functions and closures can be passed
//! to a table directly.
//!
//! **Note**: none of these are cryptographically secure.

/// Mask applied to every hash so results stay within 31 bits.
pub const HASH_MASK: u64 = 0x7FFF_FFFF;

/// Default multiplier for [`polynomial_hash`].
pub const DEFAULT_POLY_BASE: u64 = 257;

/// Initial state of [`djb2`].
const DJB2_SEED: u64 = 5381;

/// A hash function over string keys.
///
/// Implementations must be pure: the same key always hashes to the same value.
pub trait StringHasher {
    /// Hashes `key` to a non-negative integer.
    fn hash_str(&self, key: &str) -> u64;
}

impl<F> StringHasher for F
where
    F: Fn(&str) -> u64,
{
    fn hash_str(&self, key: &str) -> u64 {
        self(key)
    }
}

/// Sum of the character codes of `s`.
pub fn simple_hash(s: &str) -> u64 {
    s.chars()
        .fold(0u64, |h, ch| h.wrapping_add(ch as u64))
        & HASH_MASK
}

/// Polynomial hash with base [`DEFAULT_POLY_BASE`] and no modulus.
pub fn polynomial_hash(s: &str) -> u64 {
    polynomial_hash_with(s, DEFAULT_POLY_BASE, None)
}

/// Polynomial hash `h = h * base + c` with a configurable base.
///
/// With `modulus` set, every step is reduced modulo it. Without one the computation wraps in
/// `u64`; since only the low 31 bits survive the final mask, this matches the unbounded
/// integer result exactly.
///
/// # Panics
///
/// Panics if `modulus` is `Some(0)`.
pub fn polynomial_hash_with(s: &str, base: u64, modulus: Option<u64>) -> u64 {
    let h = match modulus {
        None => s
            .chars()
            .fold(0u64, |h, ch| h.wrapping_mul(base).wrapping_add(ch as u64)),
        Some(m) => {
            assert!(m > 0, "modulus must be > 0");
            let (base, m) = (base as u128, m as u128);
            s.chars()
                .fold(0u128, |h, ch| (h * base + ch as u128) % m) as u64
        }
    };
    h & HASH_MASK
}

/// DJB2 hash (Dan Bernstein): `h = 5381; h = h * 33 + c`.
pub fn djb2(s: &str) -> u64 {
    s.chars().fold(DJB2_SEED, |h, ch| {
        h.wrapping_mul(33).wrapping_add(ch as u64)
    }) & HASH_MASK
}
