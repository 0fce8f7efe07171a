//! # ChainDb: Persistent Storage Engine
//!
//! The persistence layer for powchain, built on sled's embedded key-value
//! store. All on-disk data flows through this module.
//!
//! ## Key Layout
//!
//! Everything lives in sled's default tree:
//!
//! | Key                 | Value                    |
//! |---------------------|--------------------------|
//! | `lh`                | tip hash (32 bytes)      |
//! | block hash (32B)    | `bincode(Block)`         |
//!
//! The tip key is two bytes long, so it can never collide with a block key.
//!
//! ## Atomicity
//!
//! A new block and the tip update go into a single `Batch`. Readers see
//! either the old tip with the old blocks or the new tip with its block
//! already present, never a tip pointing at nothing.

use std::path::Path;

use sled::{Batch, Db};
use tracing::{debug, info};

use crate::block::Block;
use crate::config::TIP_KEY;
use crate::crypto::Hash;
use crate::error::{ChainError, ChainResult};

/// Persistent block storage.
///
/// Cloning is cheap: sled handles are reference-counted and every clone
/// sees the same data. The file lock is released when the last clone drops.
#[derive(Debug, Clone)]
pub struct ChainDb {
    db: Db,
}

impl ChainDb {
    /// Open or create a store at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> ChainResult<Self> {
        let path = path.as_ref();
        let db = sled::open(path)
            .map_err(|e| ChainError::storage("open", path.display().to_string(), e))?;
        info!(path = %path.display(), "chain store opened");
        Ok(Self { db })
    }

    /// Create an in-memory store that disappears when dropped.
    ///
    /// Ideal for unit tests: no filesystem side effects, no cleanup.
    pub fn open_temporary() -> ChainResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| ChainError::storage("open", "<temporary>", e))?;
        Ok(Self { db })
    }

    // -- Tip ----------------------------------------------------------------

    /// Read the tip pointer. `None` means the store was never bootstrapped.
    pub fn get_tip(&self) -> ChainResult<Option<Hash>> {
        let Some(bytes) = self
            .db
            .get(TIP_KEY)
            .map_err(|e| ChainError::storage("get", TIP_KEY, e))?
        else {
            return Ok(None);
        };

        Hash::from_slice(&bytes).map(Some).ok_or_else(|| {
            ChainError::decode(
                TIP_KEY,
                format!("expected 32-byte hash, found {} bytes", bytes.len()),
            )
        })
    }

    // -- Blocks -------------------------------------------------------------

    /// Fetch and decode the block stored under `hash`.
    ///
    /// A value whose own hash differs from its key is reported as a decode
    /// failure. Back-pointers therefore always lead to the block they name.
    pub fn get_block(&self, hash: &Hash) -> ChainResult<Option<Block>> {
        let Some(bytes) = self
            .db
            .get(hash)
            .map_err(|e| ChainError::storage("get", hash, e))?
        else {
            return Ok(None);
        };

        let block = Block::deserialize_at(&bytes, hash.as_ref())?;
        if block.hash() != hash {
            return Err(ChainError::decode(
                hash,
                format!("stored under {hash} but hashes to {}", block.hash()),
            ));
        }
        Ok(Some(block))
    }

    /// Persist `block` and make it the tip, atomically, then flush.
    pub fn commit_block(&self, block: &Block) -> ChainResult<()> {
        let hash = block.hash();
        let bytes = block.serialize()?;

        let mut batch = Batch::default();
        batch.insert(&hash.as_bytes()[..], bytes);
        batch.insert(TIP_KEY, &hash.as_bytes()[..]);
        self.db
            .apply_batch(batch)
            .map_err(|e| ChainError::storage("commit", hash, e))?;

        self.flush()?;
        debug!(hash = %hash, "block committed");
        Ok(())
    }

    // -- Utility ------------------------------------------------------------

    /// True if the store holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Number of stored blocks (every key except the tip pointer).
    pub fn block_count(&self) -> ChainResult<usize> {
        let has_tip = self
            .db
            .contains_key(TIP_KEY)
            .map_err(|e| ChainError::storage("get", TIP_KEY, e))?;
        Ok(self.db.len() - usize::from(has_tip))
    }

    /// Block until all pending writes are durable.
    pub fn flush(&self) -> ChainResult<()> {
        self.db
            .flush()
            .map_err(|e| ChainError::storage("flush", "*", e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
