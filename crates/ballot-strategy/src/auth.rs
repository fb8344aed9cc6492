//! Voter identity resolution for direct and signed votes.
//!
//! A signed ballot commits to `(proposal_id, support)` under a domain
//! separator bound to the strategy's name, chain id and address:
//!
//! ```text
//! domain_separator = H(DOMAIN_TYPEHASH || H(name) || chain_id_be || strategy)
//! struct_hash      = H(BALLOT_TYPEHASH || proposal_id_be || support)
//! digest           = H(0x19 0x01 || domain_separator || struct_hash)
//! ```
//!
//! There is no nonce or expiry. Replaying a ballot on another proposal
//! changes the digest; replaying it on the same proposal hits the receipt
//! store's `AlreadyVoted` check.

use ballot_crypto::{verify_and_derive_address, IncrementalHasher, Keypair};
use ballot_types::{Address, Ed25519PublicKey, Ed25519Signature, Hash};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use crate::context::CallContext;
use crate::error::StrategyError;
use crate::receipt::Support;

static DOMAIN_TYPEHASH: Lazy<Hash> = Lazy::new(|| {
    Hash::compute(b"Domain(string name,uint64 chainId,address verifyingContract)")
});

static BALLOT_TYPEHASH: Lazy<Hash> = Lazy::new(|| {
    Hash::compute(b"Ballot(uint64 proposalId,uint8 support)")
});

const DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];

/// A ballot signed off-chain and submitted by a relayer.
///
/// Ed25519 cannot recover a key from a signature, so the signer's public key
/// travels with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedVote {
    pub public_key: Ed25519PublicKey,
    pub signature: Ed25519Signature,
}

/// Resolves the effective voter of a ballot.
#[derive(Debug, Clone)]
pub struct VoteAuthenticator {
    domain_separator: Hash,
}

impl VoteAuthenticator {
    /// Create an authenticator bound to a strategy deployment.
    pub fn new(name: &str, chain_id: u64, verifying_contract: Address) -> Self {
        let name_hash = Hash::compute(name.as_bytes());
        let domain_separator = IncrementalHasher::new()
            .update(DOMAIN_TYPEHASH.as_bytes())
            .update(name_hash.as_bytes())
            .update(&chain_id.to_be_bytes())
            .update(verifying_contract.as_bytes())
            .finalize();
        Self { domain_separator }
    }

    /// Domain separator mixed into every ballot digest.
    pub fn domain_separator(&self) -> Hash {
        self.domain_separator
    }

    /// Digest a voter signs to cast `support` on `proposal_id`.
    pub fn vote_digest(&self, proposal_id: u64, support: Support) -> Hash {
        let struct_hash = IncrementalHasher::new()
            .update(BALLOT_TYPEHASH.as_bytes())
            .update(&proposal_id.to_be_bytes())
            .update(&[support.as_u8()])
            .finalize();

        IncrementalHasher::new()
            .update(&DIGEST_PREFIX)
            .update(self.domain_separator.as_bytes())
            .update(struct_hash.as_bytes())
            .finalize()
    }

    /// Voter of a direct vote: the transaction sender.
    pub fn direct(ctx: &CallContext) -> Address {
        ctx.sender
    }

    /// Voter of a signed vote: the address controlled by the signing key.
    pub fn resolve_signer(
        &self,
        proposal_id: u64,
        support: Support,
        signed: &SignedVote,
    ) -> Result<Address, StrategyError> {
        let digest = self.vote_digest(proposal_id, support);
        verify_and_derive_address(&signed.public_key, digest.as_bytes(), &signed.signature).map_err(|e| {
            tracing::warn!(proposal_id, error = %e, "rejected signed vote");
            StrategyError::InvalidSignature
        })
    }

    /// Sign a ballot for this domain.
    pub fn sign_vote(&self, keypair: &Keypair, proposal_id: u64, support: Support) -> SignedVote {
        let digest = self.vote_digest(proposal_id, support);
        SignedVote {
            public_key: keypair.public_key(),
            signature: keypair.sign(digest.as_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> VoteAuthenticator {
        VoteAuthenticator::new("Ballot", 1337, Address::from_low_u64(0x5747))
    }

    #[test]
    fn test_signed_vote_resolves_signer() {
        let auth = authenticator();
        let keypair = Keypair::from_seed(&[9u8; 32]);
        let signed = auth.sign_vote(&keypair, 1, Support::For);

        assert_eq!(auth.resolve_signer(1, Support::For, &signed), Ok(keypair.address()));
    }

    #[test]
    fn test_signature_bound_to_proposal_and_support() {
        let auth = authenticator();
        let keypair = Keypair::from_seed(&[9u8; 32]);
        let signed = auth.sign_vote(&keypair, 1, Support::For);

        assert_eq!(auth.resolve_signer(2, Support::For, &signed), Err(StrategyError::InvalidSignature));
        assert_eq!(auth.resolve_signer(1, Support::Against, &signed), Err(StrategyError::InvalidSignature));
    }

    #[test]
    fn test_signature_bound_to_domain() {
        let keypair = Keypair::from_seed(&[9u8; 32]);
        let signed = authenticator().sign_vote(&keypair, 1, Support::For);

        let other_chain = VoteAuthenticator::new("Ballot", 1, Address::from_low_u64(0x5747));
        let other_contract = VoteAuthenticator::new("Ballot", 1337, Address::from_low_u64(0x5748));
        assert_ne!(other_chain.domain_separator(), authenticator().domain_separator());
        assert!(other_chain.resolve_signer(1, Support::For, &signed).is_err());
        assert!(other_contract.resolve_signer(1, Support::For, &signed).is_err());
    }

    #[test]
    fn test_forged_key_rejected() {
        let auth = authenticator();
        let signer = Keypair::from_seed(&[1u8; 32]);
        let victim = Keypair::from_seed(&[2u8; 32]);
        let mut signed = auth.sign_vote(&signer, 1, Support::For);
        signed.public_key = victim.public_key();

        assert_eq!(auth.resolve_signer(1, Support::For, &signed), Err(StrategyError::InvalidSignature));
    }

    #[test]
    fn test_zero_signature_rejected() {
        let auth = authenticator();
        let keypair = Keypair::from_seed(&[1u8; 32]);
        let signed = SignedVote {
            public_key: keypair.public_key(),
            signature: Ed25519Signature::default(),
        };
        assert_eq!(auth.resolve_signer(1, Support::For, &signed), Err(StrategyError::InvalidSignature));
    }

    #[test]
    fn test_direct_vote_is_sender() {
        let ctx = CallContext::new(Address::from_low_u64(42), 1);
        assert_eq!(VoteAuthenticator::direct(&ctx), Address::from_low_u64(42));
    }
}
