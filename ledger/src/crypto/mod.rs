//! # Cryptographic Primitives
//!
//! SHA-256 and the fixed-size digest type built on it. Nothing here is
//! hand-rolled: hashing goes through the `sha2` crate.

pub mod hash;

pub use hash::{sha256, Hash, Target};
