//! Per-proposal, per-voter vote receipts.

use std::collections::HashMap;
use ballot_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use crate::error::StrategyError;

/// Largest weight a receipt can hold (96 bits).
pub const MAX_WEIGHT: Amount = (1u128 << 96) - 1;

/// Vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Support {
    #[default]
    Against,
    For,
    Abstain,
}

impl Support {
    /// Wire encoding used in signed ballots.
    pub fn as_u8(&self) -> u8 {
        match self {
            Support::Against => 0,
            Support::For => 1,
            Support::Abstain => 2,
        }
    }
}

impl TryFrom<u8> for Support {
    type Error = StrategyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Support::Against),
            1 => Ok(Support::For),
            2 => Ok(Support::Abstain),
            other => Err(StrategyError::InvalidSupport(other)),
        }
    }
}

/// Record of how, and with what weight, an address voted on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Receipt {
    pub has_voted: bool,
    pub support: Support,
    pub weight: Amount,
}

/// Two-level receipt store: proposal id -> voter -> receipt.
///
/// Receipts are written once and never removed.
#[derive(Debug, Default)]
pub struct ReceiptStore {
    receipts: HashMap<u64, HashMap<Address, Receipt>>,
}

impl ReceiptStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `record` would succeed, without writing anything.
    pub fn ensure_can_record(
        &self,
        proposal_id: u64,
        voter: &Address,
        weight: Amount,
    ) -> Result<(), StrategyError> {
        if self.has_voted(proposal_id, voter) {
            return Err(StrategyError::AlreadyVoted);
        }
        if weight > MAX_WEIGHT {
            return Err(StrategyError::WeightOverflow(weight));
        }
        Ok(())
    }

    /// Record a vote.
    ///
    /// # Errors
    /// - `AlreadyVoted` if the voter already has a receipt for this proposal
    /// - `WeightOverflow` if `weight` does not fit in 96 bits
    pub fn record(
        &mut self,
        proposal_id: u64,
        voter: Address,
        support: Support,
        weight: Amount,
    ) -> Result<Receipt, StrategyError> {
        self.ensure_can_record(proposal_id, &voter, weight)?;

        let receipt = Receipt {
            has_voted: true,
            support,
            weight,
        };
        self.receipts
            .entry(proposal_id)
            .or_default()
            .insert(voter, receipt);

        Ok(receipt)
    }

    /// Read a receipt; the zero receipt if the voter has not voted.
    pub fn get(&self, proposal_id: u64, voter: &Address) -> Receipt {
        self.receipts
            .get(&proposal_id)
            .and_then(|by_voter| by_voter.get(voter))
            .copied()
            .unwrap_or_default()
    }

    /// Whether `voter` has a receipt on `proposal_id`.
    pub fn has_voted(&self, proposal_id: u64, voter: &Address) -> bool {
        self.get(proposal_id, voter).has_voted
    }

    /// Number of voters with a receipt on a proposal.
    pub fn voter_count(&self, proposal_id: u64) -> usize {
        self.receipts
            .get(&proposal_id)
            .map(|by_voter| by_voter.len())
            .unwrap_or(0)
    }
}
