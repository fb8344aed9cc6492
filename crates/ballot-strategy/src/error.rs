use ballot_types::{Amount, BlockNumber};
use thiserror::Error;

/// Errors surfaced by the governance token ledger.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TokenError {
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Amount, requested: Amount },

    #[error("Insufficient allowance: approved {approved}, requested {requested}")]
    InsufficientAllowance { approved: Amount, requested: Amount },

    #[error("Votes at block {block} not yet determined (current block {current})")]
    NotYetDetermined { block: BlockNumber, current: BlockNumber },

    #[error("Token supply overflow")]
    Overflow,

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur in strategy operations.
///
/// Every failing operation leaves strategy state exactly as it was before
/// the call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Proposer weight {weight} does not exceed threshold {threshold}")]
    BelowProposalThreshold { weight: Amount, threshold: Amount },

    #[error("Already voted")]
    AlreadyVoted,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid support value: {0}")]
    InvalidSupport(u8),

    #[error("Delegation locked by active proposals")]
    DelegationLocked,

    #[error("Insufficient delegated balance: available {available}, requested {requested}")]
    InsufficientDelegatedBalance { available: Amount, requested: Amount },

    #[error("Deposit at block {last_deposit_block} is not final at block {current_block}")]
    StaleSnapshotViolation {
        last_deposit_block: BlockNumber,
        current_block: BlockNumber,
    },

    #[error("Snapshot {snapshot} is not final at block {current}")]
    SnapshotNotFinalized { snapshot: BlockNumber, current: BlockNumber },

    #[error("Snapshot point {snapshot} lies after current block {current}")]
    InvalidSnapshotPoint { snapshot: BlockNumber, current: BlockNumber },

    #[error("Weight {0} exceeds 96-bit receipt capacity")]
    WeightOverflow(Amount),

    #[error("Arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid delegation: {0}")]
    InvalidDelegation(String),

    #[error("Proposal already exists: {0}")]
    ProposalAlreadyExists(u64),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(u64),

    #[error("Proposal closed: {0}")]
    ProposalClosed(u64),

    #[error("Reentrant call rejected")]
    Reentrancy,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StrategyError::BelowProposalThreshold { weight: 50, threshold: 100 };
        assert!(err.to_string().contains("50"));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_token_error_converts() {
        let err: StrategyError = TokenError::Overflow.into();
        assert_eq!(err, StrategyError::Token(TokenError::Overflow));
    }
}
