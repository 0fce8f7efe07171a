//! # Chain Configuration & Constants
//!
//! Every magic number in powchain lives here. The persisted layout depends
//! on `TIP_KEY` and the hashing preimage depends on the difficulty, so
//! changing either after a store exists breaks that store.

use std::path::PathBuf;

use crate::error::{ChainError, ChainResult};

// ---------------------------------------------------------------------------
// Proof-of-Work Parameters
// ---------------------------------------------------------------------------

/// Default difficulty in bits. 18 takes a second or so on a laptop.
pub const DEFAULT_DIFFICULTY: u32 = 18;

/// Smallest accepted difficulty. Zero would make the target 2^256, which
/// every digest beats.
pub const MIN_DIFFICULTY: u32 = 1;

/// Largest accepted difficulty. 256 would make the target 1.
pub const MAX_DIFFICULTY: u32 = 255;

/// Upper bound on the nonce search. Nonces are hashed as signed 64-bit
/// big-endian integers, so the search stops where that encoding would wrap.
pub const MAX_NONCE: u64 = i64::MAX as u64;

/// How many nonce trials run between checks of a cancellation flag.
pub const CANCEL_CHECK_INTERVAL: u64 = 4_096;

// ---------------------------------------------------------------------------
// Storage Layout
// ---------------------------------------------------------------------------

/// Reserved key holding the tip hash. Two bytes, so it can never collide
/// with a 32-byte block hash key.
pub const TIP_KEY: &[u8] = b"lh";

/// Digest length in bytes (SHA-256).
pub const HASH_LENGTH: usize = 32;

/// Payload of the block mined on first-run bootstrap.
pub const GENESIS_DATA: &[u8] = b"Genesis Block";

/// Default on-disk location of the chain store.
pub const DEFAULT_DATA_DIR: &str = "./powchain-db";

// ---------------------------------------------------------------------------
// ChainConfig
// ---------------------------------------------------------------------------

/// Everything needed to open a chain store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Directory of the sled database. Created if missing.
    pub data_dir: PathBuf,
    /// Proof-of-work difficulty for blocks mined through this store.
    pub difficulty: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl ChainConfig {
    /// Build a config for `data_dir` at the given difficulty.
    pub fn new(data_dir: impl Into<PathBuf>, difficulty: u32) -> Self {
        Self {
            data_dir: data_dir.into(),
            difficulty,
        }
    }

    /// Reject values the store cannot work with.
    pub fn validate(&self) -> ChainResult<()> {
        validate_difficulty(self.difficulty)
    }
}

/// Check that `difficulty` lies in `[MIN_DIFFICULTY, MAX_DIFFICULTY]`.
pub fn validate_difficulty(difficulty: u32) -> ChainResult<()> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(ChainError::Config(format!(
            "difficulty must be in [{MIN_DIFFICULTY}, {MAX_DIFFICULTY}], got {difficulty}"
        )));
    }
    Ok(())
}
