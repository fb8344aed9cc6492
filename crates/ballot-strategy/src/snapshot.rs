//! Snapshot strategy: weight is the voter's token voting power at the
//! proposal's snapshot block. No deposits are involved, and later transfers
//! never change a weight once the snapshot is fixed.

use ballot_types::{Address, Amount, BlockNumber, Hash};
use crate::auth::{SignedVote, VoteAuthenticator};
use crate::config::StrategyConfig;
use crate::context::CallContext;
use crate::error::StrategyError;
use crate::events::StrategyEvent;
use crate::oracle::{SnapshotOracle, WeightOracle};
use crate::receipt::{Receipt, Support};
use crate::sink::{Tally, VoteSink};
use crate::strategy::{ProposalVotingStrategy, StrategyCore};
use crate::token::GovernanceToken;

#[derive(Debug)]
pub struct SnapshotStrategy<T, S = Tally> {
    core: StrategyCore<S>,
    token: T,
}

impl<T: GovernanceToken, S: VoteSink> SnapshotStrategy<T, S> {
    /// Create a snapshot strategy reading weights from `token`.
    pub fn new(config: &StrategyConfig, token: T, sink: S) -> Result<Self, StrategyError> {
        Ok(Self {
            core: StrategyCore::new(config, sink)?,
            token,
        })
    }

    /// Shared intake, receipt and event state.
    pub fn core(&self) -> &StrategyCore<S> {
        &self.core
    }

    /// Governance token ledger.
    pub fn token(&self) -> &T {
        &self.token
    }

    /// Mutable token ledger, for the host to advance and transfer.
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    fn cast(
        &mut self,
        ctx: &CallContext,
        voter: Address,
        proposal_id: u64,
        support: Support,
    ) -> Result<Receipt, StrategyError> {
        let snapshot_point = self.core.intake().open_proposal(proposal_id)?.snapshot_point;
        let weight = SnapshotOracle::new(&self.token).weight_at(&voter, snapshot_point, ctx)?;
        self.core.record_vote(proposal_id, voter, support, weight)
    }
}

impl<T: GovernanceToken, S: VoteSink> ProposalVotingStrategy for SnapshotStrategy<T, S> {
    fn receive_proposal(
        &mut self,
        ctx: &CallContext,
        proposal_id: u64,
        proposer: Address,
        description_hash: Hash,
        snapshot_point: BlockNumber,
    ) -> Result<(), StrategyError> {
        let oracle = SnapshotOracle::new(&self.token);
        self.core
            .intake_mut()
            .receive(ctx, proposal_id, proposer, description_hash, snapshot_point, &oracle)?;
        self.core.proposal_received(ctx, proposal_id);
        Ok(())
    }

    fn vote(&mut self, ctx: &CallContext, proposal_id: u64, support: Support) -> Result<Receipt, StrategyError> {
        let voter = VoteAuthenticator::direct(ctx);
        self.cast(ctx, voter, proposal_id, support)
    }

    fn vote_by_signature(
        &mut self,
        ctx: &CallContext,
        proposal_id: u64,
        support: Support,
        signed: &SignedVote,
    ) -> Result<Receipt, StrategyError> {
        let voter = self.core.authenticator().resolve_signer(proposal_id, support, signed)?;
        self.cast(ctx, voter, proposal_id, support)
    }

    fn calculate_weight(&self, ctx: &CallContext, voter: &Address, proposal_id: u64) -> Result<Amount, StrategyError> {
        let snapshot_point = self.core.snapshot_point(proposal_id)?;
        SnapshotOracle::new(&self.token).weight_at(voter, snapshot_point, ctx)
    }

    fn get_receipt(&self, proposal_id: u64, voter: &Address) -> Receipt {
        self.core.receipts().get(proposal_id, voter)
    }

    fn update_proposal_threshold(&mut self, ctx: &CallContext, new_threshold: Amount) -> Result<(), StrategyError> {
        self.core.update_threshold(ctx, new_threshold)
    }

    fn close_proposal(&mut self, ctx: &CallContext, proposal_id: u64) -> Result<(), StrategyError> {
        self.core.close(ctx, proposal_id)
    }

    fn events(&self) -> &[StrategyEvent] {
        self.core.events().entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::CheckpointToken;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn strategy(threshold: Amount) -> (SnapshotStrategy<CheckpointToken>, StrategyConfig) {
        let config = StrategyConfig::devnet().with_threshold(threshold);
        let mut token = CheckpointToken::new();
        token.advance_to(1);
        token.mint(addr(1), 150).unwrap();
        token.mint(addr(2), 40).unwrap();
        token.advance_to(10);
        (SnapshotStrategy::new(&config, token, Tally::new()).unwrap(), config)
    }

    #[test]
    fn test_receive_and_vote() {
        let (mut strategy, config) = strategy(100);
        let lifecycle = CallContext::new(config.lifecycle_module, 10).with_timestamp(1_000);

        strategy.receive_proposal(&lifecycle, 1, addr(1), Hash::compute(b"p1"), 9).unwrap();
        assert_eq!(strategy.events()[0], StrategyEvent::ProposalReceived { id: 1, timestamp: 1_000 });

        let receipt = strategy.vote(&CallContext::new(addr(2), 10), 1, Support::For).unwrap();
        assert_eq!(receipt, Receipt { has_voted: true, support: Support::For, weight: 40 });
        assert_eq!(strategy.core().sink().get(1).for_votes, 40);
    }

    #[test]
    fn test_vote_on_unknown_proposal() {
        let (mut strategy, _) = strategy(0);
        assert_eq!(
            strategy.vote(&CallContext::new(addr(2), 10), 7, Support::For),
            Err(StrategyError::ProposalNotFound(7))
        );
        assert_eq!(
            strategy.calculate_weight(&CallContext::new(addr(2), 10), &addr(2), 7),
            Err(StrategyError::ProposalNotFound(7))
        );
    }

    #[test]
    fn test_vote_after_close() {
        let (mut strategy, config) = strategy(0);
        let lifecycle = CallContext::new(config.lifecycle_module, 10);
        strategy.receive_proposal(&lifecycle, 1, addr(1), Hash::ZERO, 9).unwrap();
        strategy.close_proposal(&lifecycle, 1).unwrap();

        assert_eq!(
            strategy.vote(&CallContext::new(addr(2), 11), 1, Support::For),
            Err(StrategyError::ProposalClosed(1))
        );
        assert_eq!(strategy.events().last(), Some(&StrategyEvent::ProposalClosed { id: 1 }));
    }
}
