use crate::error::{strip_hex_prefix, TypesError};
use std::fmt;
use std::str::FromStr;

/// 32-byte blake3 digest. Used for proposal description hashes and vote digests.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash([u8; 32]);

impl Hash {
    pub const ZERO: Self = Self([0u8; 32]);
    pub const LEN: usize = 32;

    /// Create from raw bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create from a slice, which must be exactly 32 bytes
    pub fn from_slice(slice: &[u8]) -> Result<Self, TypesError> {
        if slice.len() != Self::LEN {
            return Err(TypesError::InvalidHashLength(slice.len()));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Compute blake3 hash of data
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }

    /// Hex encoding without 0x prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

impl FromStr for Hash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(strip_hex_prefix(s))?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
