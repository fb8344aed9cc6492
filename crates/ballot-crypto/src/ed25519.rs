use crate::error::CryptoError;
use ballot_types::{Address, Ed25519PublicKey, Ed25519Signature};
use ed25519_dalek::{Signer, Verifier};
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroize;

/// Ed25519 keypair used by voters to sign ballots off-chain.
pub struct Keypair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Public half of the keypair
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Address derived from this keypair's public key
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Sign an arbitrary message
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let signature = self.signing_key.sign(message);
        Ed25519Signature::from_bytes(signature.to_bytes())
    }

    fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", self.address())
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        let mut seed = self.seed();
        let cloned = Self::from_seed(&seed);
        seed.zeroize();
        cloned
    }
}

/// Verify an ed25519 signature.
pub fn verify(
    public_key: &Ed25519PublicKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> Result<(), CryptoError> {
    let pk = ed25519_dalek::VerifyingKey::from_bytes(public_key.as_bytes())
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    pk.verify(message, &sig)
        .map_err(|_| CryptoError::VerificationFailed)
}

/// Verify `signature` over `message` and return the signer's address.
///
/// Ed25519 has no public key recovery, so the signer supplies its key
/// alongside the signature. The returned address is never zero.
pub fn verify_and_derive_address(
    public_key: &Ed25519PublicKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> Result<Address, CryptoError> {
    if public_key.is_zero() {
        return Err(CryptoError::InvalidPublicKey);
    }
    if signature.is_zero() {
        return Err(CryptoError::InvalidSignature);
    }
    verify(public_key, message, signature)?;

    let address = public_key.to_address();
    if address.is_zero() {
        return Err(CryptoError::InvalidPublicKey);
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_from_seed_is_deterministic() {
        let kp1 = Keypair::from_seed(&[42u8; 32]);
        let kp2 = Keypair::from_seed(&[42u8; 32]);

        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.address(), kp2.address());
        assert!(!kp1.address().is_zero());
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Keypair::generate();
        let message = b"ballot digest";

        let signature = keypair.sign(message);
        assert!(verify(&keypair.public_key(), message, &signature).is_ok());
        assert_eq!(
            verify(&keypair.public_key(), b"other digest", &signature),
            Err(CryptoError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_and_derive_address() {
        let keypair = Keypair::from_seed(&[7u8; 32]);
        let message = b"vote";
        let signature = keypair.sign(message);

        let address = verify_and_derive_address(&keypair.public_key(), message, &signature).unwrap();
        assert_eq!(address, keypair.address());
    }

    #[test]
    fn test_derive_rejects_wrong_key() {
        let signer = Keypair::from_seed(&[1u8; 32]);
        let other = Keypair::from_seed(&[2u8; 32]);
        let signature = signer.sign(b"vote");

        assert!(verify_and_derive_address(&other.public_key(), b"vote", &signature).is_err());
    }

    #[test]
    fn test_derive_rejects_zero_inputs() {
        let keypair = Keypair::from_seed(&[3u8; 32]);
        let signature = keypair.sign(b"vote");

        assert_eq!(
            verify_and_derive_address(&Ed25519PublicKey::default(), b"vote", &signature),
            Err(CryptoError::InvalidPublicKey)
        );
        assert_eq!(
            verify_and_derive_address(&keypair.public_key(), b"vote", &Ed25519Signature::default()),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn test_keypair_clone_signs_identically() {
        let kp1 = Keypair::generate();
        let kp2 = kp1.clone();
        assert_eq!(kp1.sign(b"test"), kp2.sign(b"test"));
    }
}
