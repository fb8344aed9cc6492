//! Outbound vote notifications to the lifecycle module.

use std::collections::HashMap;
use ballot_types::{Address, Amount};
use crate::receipt::Support;

/// Receives every successfully cast vote. Quorum math lives on the other
/// side of this boundary.
pub trait VoteSink {
    fn vote_cast(&mut self, proposal_id: u64, voter: Address, support: Support, weight: Amount);
}

/// Per-proposal running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProposalTally {
    pub for_votes: Amount,
    pub against_votes: Amount,
    pub abstain_votes: Amount,
    pub voters: u64,
}

impl ProposalTally {
    /// Sum of all three buckets.
    pub fn total_votes(&self) -> Amount {
        self.for_votes
            .saturating_add(self.against_votes)
            .saturating_add(self.abstain_votes)
    }
}

/// In-memory vote sink summing weights per proposal.
#[derive(Debug, Default)]
pub struct Tally {
    proposals: HashMap<u64, ProposalTally>,
}

impl Tally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals for a proposal; zero if nobody voted.
    pub fn get(&self, proposal_id: u64) -> ProposalTally {
        self.proposals.get(&proposal_id).copied().unwrap_or_default()
    }
}

impl VoteSink for Tally {
    fn vote_cast(&mut self, proposal_id: u64, _voter: Address, support: Support, weight: Amount) {
        let tally = self.proposals.entry(proposal_id).or_default();
        let bucket = match support {
            Support::For => &mut tally.for_votes,
            Support::Against => &mut tally.against_votes,
            Support::Abstain => &mut tally.abstain_votes,
        };
        *bucket = bucket.saturating_add(weight);
        tally.voters += 1;
    }
}
