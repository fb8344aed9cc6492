use thiserror::Error;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CryptoError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Signature verification failed")]
    VerificationFailed,
}
