// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # powchain: Core Library
//!
//! A single-node, persisted, hash-linked block ledger. Every block must pass
//! a proof-of-work gate before it is admitted: mining is expensive, checking
//! is a single SHA-256.
//!
//! ## Architecture
//!
//! - **crypto**: the 32-byte [`Hash`](crypto::Hash) type, SHA-256, and the
//!   big-endian target comparison.
//! - **block**: immutable block/header model and its on-disk encoding.
//! - **pow**: the mining search and the O(1) validation check.
//! - **storage**: sled-backed chain store, genesis bootstrap, atomic
//!   appends, and the newest-first iterator.
//! - **config**: constants and the [`ChainConfig`](config::ChainConfig) value.
//! - **error**: the [`ChainError`](error::ChainError) taxonomy.
//!
//! ## Example
//!
//! ```no_run
//! use powchain::storage::Blockchain;
//!
//! # fn main() -> powchain::error::ChainResult<()> {
//! let mut chain = Blockchain::init("./powchain-db", 16)?;
//! chain.add_block(b"hello".to_vec())?;
//!
//! for block in chain.iter() {
//!     println!("{}", block?);
//! }
//! chain.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! One writer per store. `add_block` takes `&mut self`; sharing a store
//! between threads needs an external mutex around the handle.

pub mod block;
pub mod config;
pub mod crypto;
pub mod error;
pub mod pow;
pub mod storage;

pub use block::{Block, BlockHeader};
pub use crypto::{Hash, Target};
pub use error::{ChainError, ChainResult};
pub use pow::ProofOfWork;
pub use storage::{Blockchain, ChainIterator};
