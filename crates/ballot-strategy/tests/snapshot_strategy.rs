//! End-to-end behaviour of the snapshot strategy against an in-memory
//! checkpoint token.

use ballot_crypto::Keypair;
use ballot_strategy::{
    CallContext, CheckpointToken, GovernanceToken, ProposalVotingStrategy, Receipt, SignedVote,
    SnapshotStrategy, StrategyConfig, StrategyError, StrategyEvent, Support, Tally,
};
use ballot_types::{Address, Amount, Ed25519Signature, Hash};

fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

const PROPOSER: u64 = 1;
const SMALL_HOLDER: u64 = 2;
const MID_HOLDER: u64 = 3;
const RELAYER: u64 = 5;

/// Balances minted at block 1, token advanced to block 10.
fn setup(threshold: Amount, signer: Option<&Keypair>) -> (SnapshotStrategy<CheckpointToken>, StrategyConfig) {
    let config = StrategyConfig::devnet().with_threshold(threshold);
    let mut token = CheckpointToken::new();
    token.advance_to(1);
    token.mint(addr(PROPOSER), 150).unwrap();
    token.mint(addr(SMALL_HOLDER), 40).unwrap();
    token.mint(addr(MID_HOLDER), 50).unwrap();
    if let Some(keypair) = signer {
        token.mint(keypair.address(), 70).unwrap();
    }
    token.advance_to(10);
    (SnapshotStrategy::new(&config, token, Tally::new()).unwrap(), config)
}

fn lifecycle(config: &StrategyConfig, block: u64) -> CallContext {
    CallContext::new(config.lifecycle_module, block)
}

#[test_log::test]
fn test_proposal_threshold_is_strict() {
    let (mut strategy, config) = setup(100, None);
    let ctx = lifecycle(&config, 10);

    assert_eq!(
        strategy.receive_proposal(&ctx, 1, addr(MID_HOLDER), Hash::compute(b"low"), 9),
        Err(StrategyError::BelowProposalThreshold { weight: 50, threshold: 100 })
    );
    strategy
        .receive_proposal(&ctx, 1, addr(PROPOSER), Hash::compute(b"high"), 9)
        .unwrap();

    let owner = CallContext::new(config.owner, 10);
    strategy.update_proposal_threshold(&owner, 150).unwrap();
    assert_eq!(
        strategy.receive_proposal(&ctx, 2, addr(PROPOSER), Hash::compute(b"equal"), 9),
        Err(StrategyError::BelowProposalThreshold { weight: 150, threshold: 150 })
    );

    assert_eq!(
        strategy.events(),
        &[
            StrategyEvent::ProposalReceived { id: 1, timestamp: 0 },
            StrategyEvent::ProposalThresholdUpdated { previous: 100, new: 150 },
        ]
    );
}

#[test_log::test]
fn test_intake_rejections() {
    let (mut strategy, config) = setup(0, None);

    let stranger = CallContext::new(addr(PROPOSER), 10);
    assert!(matches!(
        strategy.receive_proposal(&stranger, 1, addr(PROPOSER), Hash::ZERO, 9),
        Err(StrategyError::Unauthorized(_))
    ));

    assert_eq!(
        strategy.receive_proposal(&lifecycle(&config, 10), 1, addr(PROPOSER), Hash::ZERO, 11),
        Err(StrategyError::InvalidSnapshotPoint { snapshot: 11, current: 10 })
    );

    assert_eq!(
        strategy.receive_proposal(&lifecycle(&config, 0), 1, addr(PROPOSER), Hash::ZERO, 0),
        Err(StrategyError::ArithmeticUnderflow)
    );

    strategy
        .receive_proposal(&lifecycle(&config, 10), 1, addr(PROPOSER), Hash::ZERO, 9)
        .unwrap();
    assert_eq!(
        strategy.receive_proposal(&lifecycle(&config, 10), 1, addr(PROPOSER), Hash::ZERO, 9),
        Err(StrategyError::ProposalAlreadyExists(1))
    );
    assert_eq!(strategy.core().intake().proposal_count(), 1);
}

#[test_log::test]
fn test_second_vote_rejected_and_receipt_unchanged() {
    let (mut strategy, config) = setup(100, None);
    strategy
        .receive_proposal(&lifecycle(&config, 10), 1, addr(PROPOSER), Hash::ZERO, 9)
        .unwrap();

    let voter = CallContext::new(addr(SMALL_HOLDER), 10);
    let receipt = strategy.vote(&voter, 1, Support::For).unwrap();
    assert_eq!(receipt, Receipt { has_voted: true, support: Support::For, weight: 40 });

    assert_eq!(strategy.vote(&voter, 1, Support::Against), Err(StrategyError::AlreadyVoted));
    assert_eq!(strategy.get_receipt(1, &addr(SMALL_HOLDER)), receipt);

    let tally = strategy.core().sink().get(1);
    assert_eq!(tally.for_votes, 40);
    assert_eq!(tally.against_votes, 0);
    assert_eq!(tally.voters, 1);
}

#[test_log::test]
fn test_weight_fixed_at_snapshot() {
    let (mut strategy, config) = setup(0, None);
    strategy
        .receive_proposal(&lifecycle(&config, 10), 1, addr(PROPOSER), Hash::ZERO, 9)
        .unwrap();

    strategy.token_mut().advance_to(11);
    strategy
        .token_mut()
        .transfer(addr(PROPOSER), addr(SMALL_HOLDER), 100)
        .unwrap();
    strategy.token_mut().advance_to(12);

    let ctx = CallContext::new(addr(SMALL_HOLDER), 12);
    assert_eq!(strategy.calculate_weight(&ctx, &addr(SMALL_HOLDER), 1), Ok(40));
    assert_eq!(strategy.calculate_weight(&ctx, &addr(PROPOSER), 1), Ok(150));
    assert_eq!(strategy.token().balance_of(&addr(SMALL_HOLDER)), 140);

    let receipt = strategy.vote(&ctx, 1, Support::Abstain).unwrap();
    assert_eq!(receipt.weight, 40);
}

#[test_log::test]
fn test_vote_waits_for_snapshot_finality() {
    let (mut strategy, config) = setup(0, None);
    strategy
        .receive_proposal(&lifecycle(&config, 10), 1, addr(PROPOSER), Hash::ZERO, 10)
        .unwrap();

    let same_block = CallContext::new(addr(SMALL_HOLDER), 10);
    assert_eq!(
        strategy.vote(&same_block, 1, Support::For),
        Err(StrategyError::SnapshotNotFinalized { snapshot: 10, current: 10 })
    );
    assert!(!strategy.get_receipt(1, &addr(SMALL_HOLDER)).has_voted);

    strategy.token_mut().advance_to(11);
    let next_block = CallContext::new(addr(SMALL_HOLDER), 11);
    assert_eq!(strategy.vote(&next_block, 1, Support::For).unwrap().weight, 40);
}

#[test_log::test]
fn test_signed_vote_counts_for_signer() {
    let keypair = Keypair::from_seed(&[42u8; 32]);
    let (mut strategy, config) = setup(0, Some(&keypair));
    strategy
        .receive_proposal(&lifecycle(&config, 10), 1, addr(PROPOSER), Hash::ZERO, 9)
        .unwrap();

    let signed = strategy.core().authenticator().sign_vote(&keypair, 1, Support::For);
    let relayer = CallContext::new(addr(RELAYER), 10);

    let receipt = strategy.vote_by_signature(&relayer, 1, Support::For, &signed).unwrap();
    assert_eq!(receipt.weight, 70);
    assert!(strategy.get_receipt(1, &keypair.address()).has_voted);
    assert!(!strategy.get_receipt(1, &addr(RELAYER)).has_voted);
    assert_eq!(
        strategy.events().last(),
        Some(&StrategyEvent::VoteCast {
            proposal_id: 1,
            voter: keypair.address(),
            support: Support::For,
            weight: 70,
        })
    );

    assert_eq!(
        strategy.vote_by_signature(&relayer, 1, Support::For, &signed),
        Err(StrategyError::AlreadyVoted)
    );
}

#[test_log::test]
fn test_signed_vote_rejects_tampering() {
    let keypair = Keypair::from_seed(&[42u8; 32]);
    let (mut strategy, config) = setup(0, Some(&keypair));
    strategy
        .receive_proposal(&lifecycle(&config, 10), 1, addr(PROPOSER), Hash::ZERO, 9)
        .unwrap();
    strategy
        .receive_proposal(&lifecycle(&config, 10), 2, addr(PROPOSER), Hash::ZERO, 9)
        .unwrap();

    let signed = strategy.core().authenticator().sign_vote(&keypair, 1, Support::For);
    let relayer = CallContext::new(addr(RELAYER), 10);

    let mut bytes = *signed.signature.as_bytes();
    bytes[0] ^= 0x01;
    let tampered = SignedVote {
        signature: Ed25519Signature::from_bytes(bytes),
        ..signed
    };
    assert_eq!(
        strategy.vote_by_signature(&relayer, 1, Support::For, &tampered),
        Err(StrategyError::InvalidSignature)
    );

    // Bound to proposal id and support.
    assert_eq!(
        strategy.vote_by_signature(&relayer, 2, Support::For, &signed),
        Err(StrategyError::InvalidSignature)
    );
    assert_eq!(
        strategy.vote_by_signature(&relayer, 1, Support::Against, &signed),
        Err(StrategyError::InvalidSignature)
    );

    assert!(!strategy.get_receipt(1, &keypair.address()).has_voted);
    assert!(!strategy.get_receipt(2, &keypair.address()).has_voted);
}

#[test_log::test]
fn test_zero_weight_vote_recorded() {
    let (mut strategy, config) = setup(0, None);
    strategy
        .receive_proposal(&lifecycle(&config, 10), 1, addr(PROPOSER), Hash::ZERO, 9)
        .unwrap();

    let nobody = CallContext::new(addr(77), 10);
    let receipt = strategy.vote(&nobody, 1, Support::Against).unwrap();
    assert_eq!(receipt, Receipt { has_voted: true, support: Support::Against, weight: 0 });
    assert_eq!(strategy.vote(&nobody, 1, Support::For), Err(StrategyError::AlreadyVoted));
}
