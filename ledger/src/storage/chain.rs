//! Chain management on top of [`ChainDb`]: genesis bootstrap, proof-of-work
//! appends, tip tracking, and the explicit full-chain audit.

use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::block::Block;
use crate::config::ChainConfig;
use crate::crypto::Hash;
use crate::error::{ChainError, ChainResult};
use crate::pow::ProofOfWork;

use super::db::ChainDb;
use super::iter::ChainIterator;

/// A persisted, append-only chain of mined blocks.
///
/// Owns its storage handle from [`init`](Self::init) until
/// [`close`](Self::close). There is exactly one writer per store:
/// [`add_block`](Self::add_block) takes `&mut self`, and sharing a chain
/// between threads requires wrapping it in a mutex.
#[derive(Debug)]
pub struct Blockchain {
    db: ChainDb,
    pow: ProofOfWork,
    tip: Hash,
}

impl Blockchain {
    /// Open (or create) the chain at `path`, mining genesis on first run.
    ///
    /// On an existing store only the tip is read; earlier blocks are not
    /// rescanned. Use [`verify_chain`](Self::verify_chain) for that.
    ///
    /// # Errors
    ///
    /// - [`ChainError::Config`] for a difficulty outside `[1, 255]`,
    ///   before anything touches the disk.
    /// - [`ChainError::Storage`] / [`ChainError::Decode`] on I/O or a
    ///   malformed tip.
    /// - [`ChainError::MissingTip`] if the store holds blocks but no tip.
    pub fn init<P: AsRef<Path>>(path: P, difficulty: u32) -> ChainResult<Self> {
        let pow = ProofOfWork::new(difficulty)?;
        let db = ChainDb::open(path)?;
        Self::bootstrap(db, pow)
    }

    /// [`init`](Self::init) driven by a [`ChainConfig`].
    pub fn with_config(config: &ChainConfig) -> ChainResult<Self> {
        Self::init(&config.data_dir, config.difficulty)
    }

    /// A chain backed by an in-memory store. Nothing touches the disk.
    pub fn open_temporary(difficulty: u32) -> ChainResult<Self> {
        let pow = ProofOfWork::new(difficulty)?;
        let db = ChainDb::open_temporary()?;
        Self::bootstrap(db, pow)
    }

    fn bootstrap(db: ChainDb, pow: ProofOfWork) -> ChainResult<Self> {
        let tip = match db.get_tip()? {
            Some(tip) => {
                info!(tip = %tip, "resuming existing chain");
                tip
            }
            None if db.is_empty() => {
                let genesis = Block::genesis(&pow)?;
                db.commit_block(&genesis)?;
                info!(
                    hash = %genesis.hash(),
                    nonce = genesis.nonce(),
                    difficulty = pow.difficulty(),
                    "genesis block created"
                );
                *genesis.hash()
            }
            None => {
                // Re-mining genesis here would silently fork the ledger.
                warn!("store holds blocks but no tip pointer");
                return Err(ChainError::MissingTip);
            }
        };

        Ok(Self { db, pow, tip })
    }

    /// Mine a block for `data` on top of the current tip and persist it.
    ///
    /// The block is stamped with the current time, but never earlier than
    /// the tip, so a clock stepping backwards cannot break timestamp order.
    /// The block and the new tip are written in one atomic batch; the
    /// in-memory tip only moves once that batch is durable.
    pub fn add_block(&mut self, data: impl Into<Vec<u8>>) -> ChainResult<Block> {
        let parent = self
            .db
            .get_block(&self.tip)?
            .ok_or_else(|| ChainError::MissingBlock {
                hash: self.tip.to_hex(),
            })?;
        let timestamp = Utc::now().timestamp().max(parent.timestamp());

        let block = Block::mine_at(data, Some(self.tip), timestamp, &self.pow)?;
        self.db.commit_block(&block)?;
        self.tip = *block.hash();

        info!(
            hash = %block.hash(),
            nonce = block.nonce(),
            data_len = block.data().len(),
            "block appended"
        );
        Ok(block)
    }

    /// Newest-first iterator over a snapshot of the current tip.
    pub fn iter(&self) -> ChainIterator {
        ChainIterator::new(self.db.clone(), self.tip)
    }

    /// Hash of the most recently appended block.
    pub fn tip(&self) -> &Hash {
        &self.tip
    }

    /// Difficulty new blocks are mined at.
    pub fn difficulty(&self) -> u32 {
        self.pow.difficulty()
    }

    /// The engine new blocks are mined with.
    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Number of blocks in the store.
    pub fn block_count(&self) -> ChainResult<usize> {
        self.db.block_count()
    }

    /// Look up a block by hash.
    pub fn get_block(&self, hash: &Hash) -> ChainResult<Option<Block>> {
        self.db.get_block(hash)
    }

    /// Walk the whole chain and check every block.
    ///
    /// For each block, newest first:
    ///
    /// 1. The stored hash equals the recomputed digest.
    /// 2. The digest meets the target of the block's own difficulty.
    /// 3. Its timestamp does not exceed its successor's.
    ///
    /// Blocks filed under a foreign key never reach these checks; the
    /// iterator reports them as [`ChainError::Decode`]. The walk must end
    /// at a genesis block. Returns the number of blocks checked.
    pub fn verify_chain(&self) -> ChainResult<usize> {
        let mut expected = self.tip;
        let mut successor_time = i64::MAX;
        let mut count = 0;

        for block in self.iter() {
            let block = block?;
            let invalid = |reason: String| ChainError::InvalidBlock {
                hash: expected.to_hex(),
                reason,
            };

            let computed = block
                .compute_hash()
                .map_err(|e| invalid(e.to_string()))?;
            if computed != expected {
                return Err(invalid(format!("recomputed hash is {computed}")));
            }

            let pow = ProofOfWork::for_block(&block).map_err(|e| invalid(e.to_string()))?;
            if !pow.validate(&block) {
                return Err(invalid(format!(
                    "hash does not meet difficulty {}",
                    block.difficulty()
                )));
            }

            if block.timestamp() > successor_time {
                return Err(invalid(format!(
                    "timestamp {} is later than its successor's {successor_time}",
                    block.timestamp()
                )));
            }

            successor_time = block.timestamp();
            count += 1;
            if let Some(prev) = block.prev_hash() {
                expected = *prev;
            }
        }

        info!(blocks = count, "chain verified");
        Ok(count)
    }

    /// Flush and release the store. Consumes the chain, so it cannot be
    /// used afterwards. Live iterators keep the underlying handle open
    /// until they are dropped.
    pub fn close(self) -> ChainResult<()> {
        self.db.flush()?;
        info!(tip = %self.tip, "chain store closed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
