//! # Block Structure
//!
//! A block is one ledger entry: an opaque payload plus the metadata that
//! links it to its predecessor and proves work was spent on it.
//!
//! ## Block Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  BlockHeader                                │
//! │  ├── timestamp: i64      (Unix seconds)     │
//! │  ├── data: Vec<u8>                          │
//! │  ├── prev_hash: Option<Hash>  (None=genesis)│
//! │  ├── difficulty: u32                        │
//! │  ├── nonce: u64                             │
//! │  └── hash: Hash          (SHA-256, see pow) │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Blocks are immutable once mined. Fields are private; the only ways to
//! obtain a `Block` are mining one or decoding one from storage.
//!
//! ## Encoding
//!
//! On disk a block is bincode with fixed-width little-endian integers.
//! Decoding rejects trailing bytes so a truncated or concatenated value
//! never passes as a block.

use std::fmt;

use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::GENESIS_DATA;
use crate::crypto::Hash;
use crate::error::{ChainError, ChainResult};
use crate::pow::{PowInput, ProofOfWork};

/// Upper bound on an encoded block. Guards decoding against corrupt
/// length prefixes.
pub const MAX_ENCODED_BLOCK_BYTES: u64 = 16 * 1024 * 1024;

// ---------------------------------------------------------------------------
// BlockHeader
// ---------------------------------------------------------------------------

/// Everything that is hashed, plus the resulting hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    timestamp: i64,
    data: Vec<u8>,
    prev_hash: Option<Hash>,
    difficulty: u32,
    nonce: u64,
    hash: Hash,
}

impl BlockHeader {
    /// Unix seconds at mining time.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Caller payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Predecessor hash; `None` for genesis.
    pub fn prev_hash(&self) -> Option<&Hash> {
        self.prev_hash.as_ref()
    }

    /// Difficulty the header was mined at.
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Winning nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Digest of the preimage at `nonce`.
    pub fn hash(&self) -> &Hash {
        &self.hash
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A mined ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    header: BlockHeader,
}

impl Block {
    /// Mine a block for `data` on top of `prev_hash`, stamped with the
    /// current time. Blocks until a nonce is found.
    pub fn new(
        data: impl Into<Vec<u8>>,
        prev_hash: Option<Hash>,
        pow: &ProofOfWork,
    ) -> ChainResult<Self> {
        Self::mine_at(data, prev_hash, Utc::now().timestamp(), pow)
    }

    /// Mine the first block of a chain: fixed payload, no predecessor.
    pub fn genesis(pow: &ProofOfWork) -> ChainResult<Self> {
        Self::new(GENESIS_DATA, None, pow)
    }

    /// Mine with an explicit timestamp. Same inputs, same block.
    pub fn mine_at(
        data: impl Into<Vec<u8>>,
        prev_hash: Option<Hash>,
        timestamp: i64,
        pow: &ProofOfWork,
    ) -> ChainResult<Self> {
        let data = data.into();
        let (nonce, hash) = pow.run(PowInput {
            prev_hash: prev_hash.as_ref(),
            data: &data,
            timestamp,
        })?;

        Ok(Self {
            header: BlockHeader {
                timestamp,
                data,
                prev_hash,
                difficulty: pow.difficulty(),
                nonce,
                hash,
            },
        })
    }

    /// Encode for storage.
    pub fn serialize(&self) -> ChainResult<Vec<u8>> {
        codec()
            .serialize(self)
            .map_err(|e| ChainError::Encode(e.to_string()))
    }

    /// Decode a stored block.
    pub fn deserialize(bytes: &[u8]) -> ChainResult<Self> {
        Self::deserialize_at(bytes, b"")
    }

    /// Decode the value stored under `key`; the key only feeds errors.
    pub(crate) fn deserialize_at(bytes: &[u8], key: &[u8]) -> ChainResult<Self> {
        codec()
            .deserialize(bytes)
            .map_err(|e| ChainError::decode(key, e))
    }

    /// Recompute the header digest from the stored fields and nonce.
    pub fn compute_hash(&self) -> ChainResult<Hash> {
        let pow = ProofOfWork::for_block(self)?;
        Ok(crate::crypto::sha256(
            &pow.prepare_data(self.header().into(), self.nonce()),
        ))
    }

    /// Full header.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Block hash.
    pub fn hash(&self) -> &Hash {
        &self.header.hash
    }

    /// Predecessor hash; `None` for genesis.
    pub fn prev_hash(&self) -> Option<&Hash> {
        self.header.prev_hash.as_ref()
    }

    /// Caller payload.
    pub fn data(&self) -> &[u8] {
        &self.header.data
    }

    /// Unix seconds at mining time.
    pub fn timestamp(&self) -> i64 {
        self.header.timestamp
    }

    /// Winning nonce.
    pub fn nonce(&self) -> u64 {
        self.header.nonce
    }

    /// Difficulty the block was mined at.
    pub fn difficulty(&self) -> u32 {
        self.header.difficulty
    }

    /// True for the first block of a chain.
    pub fn is_genesis(&self) -> bool {
        self.header.prev_hash.is_none()
    }

    /// Block hash as hex.
    pub fn hash_hex(&self) -> String {
        self.header.hash.to_hex()
    }

    /// Predecessor hash as hex, empty for genesis.
    pub fn prev_hash_hex(&self) -> String {
        self.prev_hash().map(Hash::to_hex).unwrap_or_default()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = DateTime::<Utc>::from_timestamp(self.timestamp(), 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "out of range".to_string());

        writeln!(f, "Time: {} ({})", self.timestamp(), time)?;
        writeln!(f, "Data: {}", String::from_utf8_lossy(self.data()))?;
        writeln!(f, "Prev: {}", self.prev_hash_hex())?;
        writeln!(f, "Hash: {}", self.hash_hex())?;
        writeln!(f, "Nonce: {}", self.nonce())?;
        writeln!(f, "Difficulty: {}", self.difficulty())
    }
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_ENCODED_BLOCK_BYTES)
        .reject_trailing_bytes()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
