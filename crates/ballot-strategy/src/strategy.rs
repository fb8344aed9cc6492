//! The strategy contract and the state shared by its implementations.

use ballot_types::{Address, Amount, BlockNumber, Hash};
use crate::auth::{SignedVote, VoteAuthenticator};
use crate::config::StrategyConfig;
use crate::context::CallContext;
use crate::error::StrategyError;
use crate::events::{EventLog, StrategyEvent};
use crate::intake::{Proposal, ProposalIntake};
use crate::receipt::{Receipt, ReceiptStore, Support};
use crate::sink::VoteSink;

/// What the proposal-lifecycle module expects from a voting strategy.
pub trait ProposalVotingStrategy {
    /// Accept a new proposal. Only the lifecycle module may call this.
    fn receive_proposal(
        &mut self,
        ctx: &CallContext,
        proposal_id: u64,
        proposer: Address,
        description_hash: Hash,
        snapshot_point: BlockNumber,
    ) -> Result<(), StrategyError>;

    /// Cast a vote as the transaction sender.
    fn vote(&mut self, ctx: &CallContext, proposal_id: u64, support: Support) -> Result<Receipt, StrategyError>;

    /// Cast a vote on behalf of the ballot's signer.
    fn vote_by_signature(
        &mut self,
        ctx: &CallContext,
        proposal_id: u64,
        support: Support,
        signed: &SignedVote,
    ) -> Result<Receipt, StrategyError>;

    /// Weight `voter` would vote with on `proposal_id`.
    fn calculate_weight(&self, ctx: &CallContext, voter: &Address, proposal_id: u64) -> Result<Amount, StrategyError>;

    fn get_receipt(&self, proposal_id: u64, voter: &Address) -> Receipt;

    /// Owner-only.
    fn update_proposal_threshold(&mut self, ctx: &CallContext, new_threshold: Amount) -> Result<(), StrategyError>;

    /// Stop accepting votes on a proposal. Only the lifecycle module may call this.
    fn close_proposal(&mut self, ctx: &CallContext, proposal_id: u64) -> Result<(), StrategyError>;

    fn events(&self) -> &[StrategyEvent];
}

/// Intake, receipts, authentication, ownership and events shared by every
/// strategy variant.
#[derive(Debug)]
pub struct StrategyCore<S> {
    owner: Address,
    token: Address,
    voting_period: u64,
    intake: ProposalIntake,
    receipts: ReceiptStore,
    authenticator: VoteAuthenticator,
    events: EventLog,
    sink: S,
}

impl<S: VoteSink> StrategyCore<S> {
    /// Create the shared state from a validated configuration.
    pub fn new(config: &StrategyConfig, sink: S) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self {
            owner: config.owner,
            token: config.token,
            voting_period: config.voting_period,
            intake: ProposalIntake::new(config.lifecycle_module, config.proposal_threshold),
            receipts: ReceiptStore::new(),
            authenticator: VoteAuthenticator::new(&config.name, config.chain_id, config.strategy_address),
            events: EventLog::new(),
            sink,
        })
    }

    /// Account allowed to change the proposal threshold.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Governance token address.
    pub fn token(&self) -> Address {
        self.token
    }

    /// Voting period in blocks.
    pub fn voting_period(&self) -> u64 {
        self.voting_period
    }

    /// Proposal intake and threshold.
    pub fn intake(&self) -> &ProposalIntake {
        &self.intake
    }

    pub(crate) fn intake_mut(&mut self) -> &mut ProposalIntake {
        &mut self.intake
    }

    /// Vote receipts for every proposal.
    pub fn receipts(&self) -> &ReceiptStore {
        &self.receipts
    }

    /// Voter resolution for direct and signed votes.
    pub fn authenticator(&self) -> &VoteAuthenticator {
        &self.authenticator
    }

    /// Vote sink notified of each cast vote.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Events emitted so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Look up a received proposal.
    pub fn proposal(&self, proposal_id: u64) -> Option<&Proposal> {
        self.intake.proposal(proposal_id)
    }

    /// Snapshot point of a known proposal.
    pub fn snapshot_point(&self, proposal_id: u64) -> Result<BlockNumber, StrategyError> {
        self.intake
            .proposal(proposal_id)
            .map(|p| p.snapshot_point)
            .ok_or(StrategyError::ProposalNotFound(proposal_id))
    }

    pub(crate) fn emit(&mut self, event: StrategyEvent) {
        self.events.emit(event);
    }

    pub(crate) fn proposal_received(&mut self, ctx: &CallContext, proposal_id: u64) {
        self.emit(StrategyEvent::ProposalReceived {
            id: proposal_id,
            timestamp: ctx.timestamp,
        });
    }

    /// Write the receipt, notify the lifecycle module and log the vote.
    pub(crate) fn record_vote(
        &mut self,
        proposal_id: u64,
        voter: Address,
        support: Support,
        weight: Amount,
    ) -> Result<Receipt, StrategyError> {
        let receipt = self.receipts.record(proposal_id, voter, support, weight)?;
        self.sink.vote_cast(proposal_id, voter, support, weight);
        self.emit(StrategyEvent::VoteCast {
            proposal_id,
            voter,
            support,
            weight,
        });
        Ok(receipt)
    }

    pub(crate) fn update_threshold(&mut self, ctx: &CallContext, new_threshold: Amount) -> Result<(), StrategyError> {
        if ctx.sender != self.owner {
            return Err(StrategyError::Unauthorized(format!("{} is not the owner", ctx.sender)));
        }
        let previous = self.intake.set_threshold(new_threshold);
        self.emit(StrategyEvent::ProposalThresholdUpdated {
            previous,
            new: new_threshold,
        });
        Ok(())
    }

    pub(crate) fn close(&mut self, ctx: &CallContext, proposal_id: u64) -> Result<(), StrategyError> {
        self.intake.close(ctx, proposal_id)?;
        self.emit(StrategyEvent::ProposalClosed { id: proposal_id });
        Ok(())
    }
}
