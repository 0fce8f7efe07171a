//! Newest-first traversal of a stored chain.

use std::iter::FusedIterator;

use crate::block::Block;
use crate::crypto::Hash;
use crate::error::{ChainError, ChainResult};

use super::db::ChainDb;

/// Walks the chain from a tip snapshot back to genesis.
///
/// The tip is captured when the iterator is created; blocks appended later
/// are not visited. Not restartable: ask the store for a new iterator to
/// traverse again. Assumes a single writer and no deletion while it runs.
///
/// Yields `Err` at most once and is exhausted afterwards. Every entry is
/// checked against the key it was read from, so a corrupt back-pointer can
/// end the walk early but never send it in a loop.
#[derive(Debug, Clone)]
pub struct ChainIterator {
    db: ChainDb,
    cursor: Option<Hash>,
}

impl ChainIterator {
    pub(crate) fn new(db: ChainDb, tip: Hash) -> Self {
        Self {
            db,
            cursor: Some(tip),
        }
    }

    /// Hash of the block the next call to `next` will fetch, if any.
    pub fn cursor(&self) -> Option<&Hash> {
        self.cursor.as_ref()
    }
}

impl Iterator for ChainIterator {
    type Item = ChainResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.cursor.take()?;
        match self.db.get_block(&hash) {
            Ok(Some(block)) => {
                self.cursor = block.prev_hash().copied();
                Some(Ok(block))
            }
            Ok(None) => Some(Err(ChainError::MissingBlock {
                hash: hash.to_hex(),
            })),
            Err(e) => Some(Err(e)),
        }
    }
}

impl FusedIterator for ChainIterator {}
