//! Error types for the chain store and the proof-of-work engine.
//!
//! Every fallible operation in the crate returns a [`ChainError`]. Nothing
//! here is retried or repaired automatically; the caller decides.

use thiserror::Error;

/// Errors raised by the ledger.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The underlying sled store failed to open, read, write, or flush.
    #[error("storage {op} failed (key: {key}): {source}")]
    Storage {
        /// The operation that failed, e.g. `"open"`, `"get"`, `"commit"`.
        op: &'static str,
        /// The key involved, hex-encoded for block hashes.
        key: String,
        /// The sled error.
        #[source]
        source: sled::Error,
    },

    /// Persisted bytes did not decode into a well-formed value.
    #[error("failed to decode value at key {key}: {reason}")]
    Decode {
        /// The key whose value was malformed.
        key: String,
        /// What went wrong.
        reason: String,
    },

    /// A block could not be encoded for storage.
    #[error("failed to encode block: {0}")]
    Encode(String),

    /// Invalid configuration, rejected before any mining or I/O.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The store holds blocks but no tip pointer.
    #[error("tip pointer missing from a non-empty store")]
    MissingTip,

    /// A back-pointer references a hash with no stored block.
    #[error("block {hash} referenced by the chain is not in the store")]
    MissingBlock {
        /// Hex-encoded hash that was looked up.
        hash: String,
    },

    /// A stored block failed the full-chain audit.
    #[error("block {hash} is invalid: {reason}")]
    InvalidBlock {
        /// Hex-encoded hash of the offending block.
        hash: String,
        /// Which check failed.
        reason: String,
    },

    /// Every nonce up to the bound was tried without meeting the target.
    #[error("no nonce up to {max_nonce} satisfies the target")]
    ExhaustedSearchSpace {
        /// The largest nonce tried.
        max_nonce: u64,
    },
}

impl ChainError {
    /// Wrap a sled error with the operation and key that produced it.
    pub fn storage(op: &'static str, key: impl AsRef<[u8]>, source: sled::Error) -> Self {
        ChainError::Storage {
            op,
            key: display_key(key.as_ref()),
            source,
        }
    }

    /// Build a decode failure for the value stored at `key`.
    pub fn decode(key: impl AsRef<[u8]>, reason: impl ToString) -> Self {
        ChainError::Decode {
            key: display_key(key.as_ref()),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type ChainResult<T> = Result<T, ChainError>;

/// Render a storage key for error messages: printable ASCII (paths, the tip
/// key) as-is, everything else as hex.
fn display_key(key: &[u8]) -> String {
    if !key.is_empty() && key.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        String::from_utf8_lossy(key).into_owned()
    } else {
        hex::encode(key)
    }
}
