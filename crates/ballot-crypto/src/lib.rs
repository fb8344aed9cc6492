//! Ballot Crypto - Cryptographic primitives for signed votes.
//!
//! This crate provides:
//! - Ed25519 keypairs and signature verification
//! - Incremental blake3 hashing for typed-data digests

pub mod ed25519;
pub mod hash;
pub mod error;

pub use ed25519::{Keypair, verify_and_derive_address};
pub use hash::IncrementalHasher;
pub use error::CryptoError;
