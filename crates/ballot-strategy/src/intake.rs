//! Proposal intake from the lifecycle module.

use std::collections::HashMap;
use ballot_types::{Address, Amount, BlockNumber, Hash};
use crate::context::CallContext;
use crate::error::StrategyError;
use crate::oracle::WeightOracle;

/// A proposal as known to a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Id assigned by the lifecycle module
    pub id: u64,
    pub proposer: Address,
    /// Block at which voting weight is measured. Fixed at intake.
    pub snapshot_point: BlockNumber,
    pub description_hash: Hash,
    /// Block the proposal was received at
    pub received_at: BlockNumber,
    /// Cleared when the lifecycle module closes the proposal
    pub active: bool,
}

/// Accepts proposals from the registered lifecycle module.
#[derive(Debug)]
pub struct ProposalIntake {
    lifecycle_module: Address,
    proposal_threshold: Amount,
    proposals: HashMap<u64, Proposal>,
}

impl ProposalIntake {
    /// Create an intake accepting proposals from `lifecycle_module`.
    pub fn new(lifecycle_module: Address, proposal_threshold: Amount) -> Self {
        Self {
            lifecycle_module,
            proposal_threshold,
            proposals: HashMap::new(),
        }
    }

    /// Module allowed to submit and close proposals.
    pub fn lifecycle_module(&self) -> Address {
        self.lifecycle_module
    }

    /// Weight a proposer must strictly exceed.
    pub fn threshold(&self) -> Amount {
        self.proposal_threshold
    }

    /// Replace the threshold, returning the previous value.
    pub fn set_threshold(&mut self, threshold: Amount) -> Amount {
        std::mem::replace(&mut self.proposal_threshold, threshold)
    }

    /// Look up a proposal, open or closed.
    pub fn proposal(&self, id: u64) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    /// Number of proposals ever received.
    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    /// A proposal that is still accepting votes.
    pub fn open_proposal(&self, id: u64) -> Result<&Proposal, StrategyError> {
        let proposal = self
            .proposals
            .get(&id)
            .ok_or(StrategyError::ProposalNotFound(id))?;
        if !proposal.active {
            return Err(StrategyError::ProposalClosed(id));
        }
        Ok(proposal)
    }

    /// Validate and store a new proposal.
    ///
    /// The proposer's weight one block before `ctx.block_number` must
    /// strictly exceed the threshold. Ids must be fresh.
    pub fn receive(
        &mut self,
        ctx: &CallContext,
        proposal_id: u64,
        proposer: Address,
        description_hash: Hash,
        snapshot_point: BlockNumber,
        oracle: &(impl WeightOracle + ?Sized),
    ) -> Result<&Proposal, StrategyError> {
        self.ensure_lifecycle(ctx)?;

        if self.proposals.contains_key(&proposal_id) {
            return Err(StrategyError::ProposalAlreadyExists(proposal_id));
        }
        if snapshot_point > ctx.block_number {
            return Err(StrategyError::InvalidSnapshotPoint {
                snapshot: snapshot_point,
                current: ctx.block_number,
            });
        }

        let eligibility_point = ctx.prior_block()?;
        let weight = oracle.weight_at(&proposer, eligibility_point, ctx)?;
        if weight <= self.proposal_threshold {
            tracing::warn!(proposal_id, %proposer, weight, threshold = self.proposal_threshold, "proposer below threshold");
            return Err(StrategyError::BelowProposalThreshold {
                weight,
                threshold: self.proposal_threshold,
            });
        }

        let proposal = Proposal {
            id: proposal_id,
            proposer,
            snapshot_point,
            description_hash,
            received_at: ctx.block_number,
            active: true,
        };
        Ok(self.proposals.entry(proposal_id).or_insert(proposal))
    }

    /// Mark a proposal closed. Only the lifecycle module may close.
    pub fn close(&mut self, ctx: &CallContext, proposal_id: u64) -> Result<&Proposal, StrategyError> {
        self.ensure_lifecycle(ctx)?;

        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or(StrategyError::ProposalNotFound(proposal_id))?;
        if !proposal.active {
            return Err(StrategyError::ProposalClosed(proposal_id));
        }
        proposal.active = false;
        Ok(proposal)
    }

    fn ensure_lifecycle(&self, ctx: &CallContext) -> Result<(), StrategyError> {
        if ctx.sender != self.lifecycle_module {
            return Err(StrategyError::Unauthorized(format!(
                "{} is not the lifecycle module",
                ctx.sender
            )));
        }
        Ok(())
    }
}
