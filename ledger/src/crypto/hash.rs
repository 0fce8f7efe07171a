//! # Hashing Utilities
//!
//! The ledger uses a single digest: SHA-256. Its 32-byte output is wrapped
//! in [`Hash`], which doubles as a 256-bit unsigned integer in big-endian
//! order whenever the proof-of-work check needs a magnitude comparison.
//!
//! ## Comparison
//!
//! Comparing two fixed-length big-endian byte arrays lexicographically is
//! exactly the same as comparing the integers they encode. `[u8; 32]`
//! already implements `Ord` that way, so the target check is a plain `<`.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{validate_difficulty, HASH_LENGTH};
use crate::error::ChainResult;

/// Compute the SHA-256 digest of `data`.
///
/// # Example
///
/// ```
/// use powchain::crypto::sha256;
///
/// let hash = sha256(b"powchain");
/// assert_eq!(hash.as_bytes().len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; HASH_LENGTH];
    output.copy_from_slice(&result);
    Hash(output)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// A 32-byte SHA-256 digest.
///
/// Ordering is numeric: `a < b` iff the big-endian integer encoded by `a`
/// is smaller than the one encoded by `b`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a stored value. Returns `None` unless `bytes` is exactly
    /// 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; HASH_LENGTH] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    /// Raw big-endian bytes.
    pub const fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// True iff this digest, read as an unsigned big-endian integer, is
    /// strictly below `target`.
    pub fn meets_target(&self, target: &Target) -> bool {
        self.0 < target.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// The admission threshold `2^(256 - difficulty)`, big-endian.
///
/// Only difficulties in `[1, 255]` are representable: the threshold then
/// has exactly one bit set, somewhere between bit 1 and bit 255.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Target([u8; HASH_LENGTH]);

impl Target {
    /// Derive the target for `difficulty` bits.
    pub fn from_difficulty(difficulty: u32) -> ChainResult<Self> {
        validate_difficulty(difficulty)?;

        let bit = (256 - difficulty) as usize;
        let mut bytes = [0u8; HASH_LENGTH];
        bytes[HASH_LENGTH - 1 - bit / 8] = 1 << (bit % 8);
        Ok(Self(bytes))
    }

    /// Raw big-endian bytes.
    pub const fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChainError;

    #[test]
    fn sha256_known_vector() {
        // NIST test vector for "abc".
        assert_eq!(
            sha256(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn from_slice_requires_exact_length() {
        assert!(Hash::from_slice(&[0u8; 32]).is_some());
        assert!(Hash::from_slice(&[0u8; 31]).is_none());
        assert!(Hash::from_slice(&[0u8; 33]).is_none());
        assert!(Hash::from_slice(&[]).is_none());
    }

    #[test]
    fn target_layout_at_edges() {
        // difficulty 1 -> 2^255: top bit of the first byte.
        let t1 = Target::from_difficulty(1).unwrap();
        assert_eq!(t1.as_bytes()[0], 0x80);
        assert!(t1.as_bytes()[1..].iter().all(|b| *b == 0));

        // difficulty 8 -> 2^248: lowest bit of the first byte.
        let t8 = Target::from_difficulty(8).unwrap();
        assert_eq!(t8.as_bytes()[0], 0x01);

        // difficulty 255 -> 2^1: second-lowest bit of the last byte.
        let t255 = Target::from_difficulty(255).unwrap();
        assert_eq!(t255.as_bytes()[31], 0x02);
        assert!(t255.as_bytes()[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn target_rejects_degenerate_difficulty() {
        assert!(matches!(
            Target::from_difficulty(0),
            Err(ChainError::Config(_))
        ));
        assert!(matches!(
            Target::from_difficulty(256),
            Err(ChainError::Config(_))
        ));
    }

    #[test]
    fn targets_shrink_as_difficulty_grows() {
        let mut previous = Target::from_difficulty(1).unwrap();
        for difficulty in 2..=255 {
            let next = Target::from_difficulty(difficulty).unwrap();
            assert!(next < previous, "difficulty {difficulty}");
            previous = next;
        }
    }

    #[test]
    fn meets_target_is_strict_big_endian_comparison() {
        let target = Target::from_difficulty(8).unwrap(); // 0x01 00 .. 00

        let mut below = [0xFFu8; 32];
        below[0] = 0x00;
        assert!(Hash::new(below).meets_target(&target));

        let mut equal = [0u8; 32];
        equal[0] = 0x01;
        assert!(!Hash::new(equal).meets_target(&target));

        // A large low byte never outweighs a higher leading byte.
        let mut above = [0u8; 32];
        above[0] = 0x01;
        above[31] = 0x01;
        assert!(!Hash::new(above).meets_target(&target));
    }

    #[test]
    fn display_is_lowercase_hex() {
        let hash = Hash::new([0xAB; 32]);
        assert_eq!(hash.to_string(), "ab".repeat(32));
        assert_eq!(format!("{hash:?}"), format!("Hash({})", "ab".repeat(32)));
    }
}
