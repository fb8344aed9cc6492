//! Deposit-delegation strategy: weight is the amount of governance token
//! deposited with the strategy and assigned to the voter.
//!
//! Deposits must predate the current block to count. A delegatee that
//! proposes or votes on a proposal is locked until that proposal closes, so
//! the same deposit cannot be withdrawn and re-delegated to vote twice.

use std::collections::HashMap;
use ballot_types::{Address, Amount, BlockNumber, Hash};
use crate::auth::{SignedVote, VoteAuthenticator};
use crate::config::StrategyConfig;
use crate::context::CallContext;
use crate::error::StrategyError;
use crate::events::StrategyEvent;
use crate::ledger::DelegationLedger;
use crate::oracle::WeightOracle;
use crate::receipt::{Receipt, Support};
use crate::sink::{Tally, VoteSink};
use crate::strategy::{ProposalVotingStrategy, StrategyCore};
use crate::token::GovernanceToken;

#[derive(Debug)]
pub struct DepositDelegationStrategy<T, S = Tally> {
    core: StrategyCore<S>,
    ledger: DelegationLedger,
    token: T,
    /// proposal id -> delegatees locked on its behalf
    locks: HashMap<u64, Vec<Address>>,
}

impl<T: GovernanceToken, S: VoteSink> DepositDelegationStrategy<T, S> {
    /// Create a deposit strategy holding deposits at `config.strategy_address`.
    pub fn new(config: &StrategyConfig, token: T, sink: S) -> Result<Self, StrategyError> {
        Ok(Self {
            core: StrategyCore::new(config, sink)?,
            ledger: DelegationLedger::new(config.strategy_address),
            token,
            locks: HashMap::new(),
        })
    }

    /// Shared intake, receipt and event state.
    pub fn core(&self) -> &StrategyCore<S> {
        &self.core
    }

    /// Delegation ledger backing every weight.
    pub fn ledger(&self) -> &DelegationLedger {
        &self.ledger
    }

    /// Governance token ledger.
    pub fn token(&self) -> &T {
        &self.token
    }

    /// Mutable token ledger, for the host to advance and transfer.
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    /// Delegatees currently locked by `proposal_id`.
    pub fn locked_by(&self, proposal_id: u64) -> &[Address] {
        self.locks
            .get(&proposal_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Deposit `amount` of the caller's tokens and assign it to `delegatee`.
    /// The caller must have approved the strategy address beforehand.
    pub fn delegate(&mut self, ctx: &CallContext, delegatee: Address, amount: Amount) -> Result<(), StrategyError> {
        self.ledger.delegate(ctx, &mut self.token, delegatee, amount)?;
        self.core.emit(StrategyEvent::VotesDelegated {
            delegator: ctx.sender,
            delegatee,
            amount,
        });
        Ok(())
    }

    /// Withdraw `amount` of the caller's deposit from `delegatee`.
    pub fn undelegate(&mut self, ctx: &CallContext, delegatee: Address, amount: Amount) -> Result<(), StrategyError> {
        self.ledger.undelegate(ctx, &mut self.token, delegatee, amount)?;
        self.core.emit(StrategyEvent::VotesUndelegated {
            delegator: ctx.sender,
            delegatee,
            amount,
        });
        Ok(())
    }

    fn lock(&mut self, proposal_id: u64, delegatee: Address) -> Result<(), StrategyError> {
        if self.locked_by(proposal_id).contains(&delegatee) {
            return Ok(());
        }
        self.ledger.lock_for_proposal(delegatee)?;
        self.locks.entry(proposal_id).or_default().push(delegatee);
        Ok(())
    }

    fn cast(
        &mut self,
        ctx: &CallContext,
        voter: Address,
        proposal_id: u64,
        support: Support,
    ) -> Result<Receipt, StrategyError> {
        let snapshot_point = self.core.intake().open_proposal(proposal_id)?.snapshot_point;
        let weight = self.ledger.weight_at(&voter, snapshot_point, ctx)?;
        self.core.receipts().ensure_can_record(proposal_id, &voter, weight)?;

        if weight > 0 {
            self.lock(proposal_id, voter)?;
        }
        self.core.record_vote(proposal_id, voter, support, weight)
    }
}

impl<T: GovernanceToken, S: VoteSink> ProposalVotingStrategy for DepositDelegationStrategy<T, S> {
    fn receive_proposal(
        &mut self,
        ctx: &CallContext,
        proposal_id: u64,
        proposer: Address,
        description_hash: Hash,
        snapshot_point: BlockNumber,
    ) -> Result<(), StrategyError> {
        self.ledger.ensure_lockable(&proposer)?;
        self.core
            .intake_mut()
            .receive(ctx, proposal_id, proposer, description_hash, snapshot_point, &self.ledger)?;
        self.lock(proposal_id, proposer)?;
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
        self.ledger.weight_at(voter, snapshot_point, ctx)
    }

    fn get_receipt(&self, proposal_id: u64, voter: &Address) -> Receipt {
        self.core.receipts().get(proposal_id, voter)
    }

    fn update_proposal_threshold(&mut self, ctx: &CallContext, new_threshold: Amount) -> Result<(), StrategyError> {
        self.core.update_threshold(ctx, new_threshold)
    }

    /// Closes the proposal and releases every lock it holds.
    fn close_proposal(&mut self, ctx: &CallContext, proposal_id: u64) -> Result<(), StrategyError> {
        let locked = self.locks.get(&proposal_id).cloned().unwrap_or_default();
        if locked
            .iter()
            .any(|delegatee| self.ledger.active_proposal_count(delegatee) == 0)
        {
            return Err(StrategyError::ArithmeticUnderflow);
        }

        self.core.close(ctx, proposal_id)?;
        for delegatee in locked {
            self.ledger.unlock_after_proposal(delegatee)?;
        }
        self.locks.remove(&proposal_id);
        Ok(())
    }

    fn events(&self) -> &[StrategyEvent] {
        self.core.events().entries()
    }
}
