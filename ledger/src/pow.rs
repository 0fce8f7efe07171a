//! # Proof-of-Work Engine
//!
//! A block is admitted only if the SHA-256 of its header, read as a
//! big-endian 256-bit integer, is strictly below `2^(256 - difficulty)`.
//!
//! ## Preimage Layout
//!
//! ```text
//! prev_hash (0 or 32 bytes) || data || be64(timestamp) || be64(difficulty) || be64(nonce)
//! ```
//!
//! Genesis has no predecessor and contributes zero bytes for `prev_hash`.
//! The three integers are encoded as signed 64-bit big-endian values.
//!
//! ## Cost Model
//!
//! [`ProofOfWork::run`] tries nonces 0, 1, 2, ... and takes the first hit,
//! so the expected cost is `2^difficulty` digests and the result is the
//! smallest valid nonce. [`ProofOfWork::validate`] recomputes one digest.
//! Mining blocks the calling thread; use [`ProofOfWork::run_until`] from a
//! worker thread if the search must be cancellable.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::block::{Block, BlockHeader};
use crate::config::{CANCEL_CHECK_INTERVAL, MAX_NONCE};
use crate::crypto::{sha256, Hash, Target};
use crate::error::{ChainError, ChainResult};

/// The hashed fields of a header, everything except the nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowInput<'a> {
    /// Predecessor hash, `None` for genesis.
    pub prev_hash: Option<&'a Hash>,
    /// Caller payload.
    pub data: &'a [u8],
    /// Unix seconds.
    pub timestamp: i64,
}

impl<'a> From<&'a BlockHeader> for PowInput<'a> {
    fn from(header: &'a BlockHeader) -> Self {
        Self {
            prev_hash: header.prev_hash(),
            data: header.data(),
            timestamp: header.timestamp(),
        }
    }
}

/// Mining and validation at a fixed difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
    target: Target,
    max_nonce: u64,
}

impl ProofOfWork {
    /// Build an engine for `difficulty` bits.
    ///
    /// # Errors
    ///
    /// [`ChainError::Config`] unless `difficulty` is in `[1, 255]`.
    pub fn new(difficulty: u32) -> ChainResult<Self> {
        Ok(Self {
            difficulty,
            target: Target::from_difficulty(difficulty)?,
            max_nonce: MAX_NONCE,
        })
    }

    /// Build an engine at the difficulty `block` was mined with.
    pub fn for_block(block: &Block) -> ChainResult<Self> {
        Self::new(block.difficulty())
    }

    /// Lower the search bound. Nonces above `max_nonce` are never tried.
    pub fn with_max_nonce(mut self, max_nonce: u64) -> Self {
        self.max_nonce = max_nonce.min(MAX_NONCE);
        self
    }

    /// Difficulty in bits.
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// The admission threshold.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Concatenate the hashing preimage for `nonce`.
    pub fn prepare_data(&self, input: PowInput<'_>, nonce: u64) -> Vec<u8> {
        let mut buf = self.prefix(input);
        buf.extend_from_slice(&(nonce as i64).to_be_bytes());
        buf
    }

    /// Search for the smallest nonce whose digest meets the target.
    ///
    /// # Errors
    ///
    /// [`ChainError::ExhaustedSearchSpace`] if no nonce up to the bound
    /// works. At the default bound this does not happen in practice.
    pub fn run(&self, input: PowInput<'_>) -> ChainResult<(u64, Hash)> {
        // `|| false` never interrupts, so `None` only means exhaustion.
        self.search(input, || false)?
            .ok_or(ChainError::ExhaustedSearchSpace {
                max_nonce: self.max_nonce,
            })
    }

    /// Like [`run`](Self::run), but polls `stop` every
    /// [`CANCEL_CHECK_INTERVAL`] trials and returns `Ok(None)` once it is set.
    pub fn run_until(
        &self,
        input: PowInput<'_>,
        stop: &AtomicBool,
    ) -> ChainResult<Option<(u64, Hash)>> {
        self.search(input, || stop.load(Ordering::Relaxed))
    }

    /// Recompute the digest from the stored nonce and check it against the
    /// target.
    pub fn validate(&self, block: &Block) -> bool {
        let preimage = self.prepare_data(block.header().into(), block.nonce());
        sha256(&preimage).meets_target(&self.target)
    }

    fn prefix(&self, input: PowInput<'_>) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + input.data.len() + 24);
        if let Some(prev) = input.prev_hash {
            buf.extend_from_slice(prev.as_bytes());
        }
        buf.extend_from_slice(input.data);
        buf.extend_from_slice(&input.timestamp.to_be_bytes());
        buf.extend_from_slice(&i64::from(self.difficulty).to_be_bytes());
        buf
    }

    fn search(
        &self,
        input: PowInput<'_>,
        should_stop: impl Fn() -> bool,
    ) -> ChainResult<Option<(u64, Hash)>> {
        debug!(
            difficulty = self.difficulty,
            data_len = input.data.len(),
            "mining block"
        );

        // Only the trailing nonce changes between trials.
        let mut buf = self.prefix(input);
        let prefix_len = buf.len();

        let mut nonce = 0u64;
        loop {
            if nonce % CANCEL_CHECK_INTERVAL == 0 && should_stop() {
                debug!(tried = nonce, "mining cancelled");
                return Ok(None);
            }

            buf.truncate(prefix_len);
            buf.extend_from_slice(&(nonce as i64).to_be_bytes());
            let hash = sha256(&buf);

            if hash.meets_target(&self.target) {
                debug!(nonce, hash = %hash, "block mined");
                return Ok(Some((nonce, hash)));
            }

            if nonce >= self.max_nonce {
                return Err(ChainError::ExhaustedSearchSpace {
                    max_nonce: self.max_nonce,
                });
            }
            nonce += 1;
        }
    }
}
