//! # Storage Module
//!
//! Persistence for the ledger.
//!
//! ## Architecture
//!
//! ```text
//! db.rs     sled wrapper: tip pointer, block entries, atomic commits
//! chain.rs  Blockchain: genesis bootstrap, mining appends, audit
//! iter.rs   ChainIterator: newest-first walk over a tip snapshot
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! add_block(data) → ProofOfWork::run → Block → ChainDb::commit_block
//!                                               (block + tip, one batch)
//! iter() → ChainIterator → ChainDb::get_block → prev_hash → ... → genesis
//! ```
//!
//! ## Design Decisions
//!
//! 1. **Lazy integrity.** Opening a store reads the tip and nothing else.
//!    Full validation is an explicit call to `Blockchain::verify_chain`.
//!
//! 2. **Bincode on disk.** Compact and deterministic. `Display` on a block
//!    is for humans only.
//!
//! 3. **No re-bootstrap.** A non-empty store without a tip is reported as
//!    corrupt instead of getting a fresh genesis.

pub mod chain;
pub mod db;
pub mod iter;

pub use chain::Blockchain;
pub use db::ChainDb;
pub use iter::ChainIterator;
