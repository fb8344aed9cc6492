//! Ballot Types - Core type definitions shared by the Ballot voting strategies.
//!
//! This crate provides:
//! - Addresses (20-byte, Bech32m encoded)
//! - Hashes (32-byte, blake3 digests)
//! - Ed25519 signatures and public keys carried by signed votes

pub mod address;
pub mod hash;
pub mod signature;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use address::Address;
pub use hash::Hash;
pub use signature::{Ed25519Signature, Ed25519PublicKey};
pub use error::TypesError;

/// Token amounts and vote weights.
pub type Amount = u128;

/// Block heights, used as snapshot points.
pub type BlockNumber = u64;
