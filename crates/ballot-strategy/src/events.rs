//! Append-only strategy event log.

use ballot_types::{Address, Amount};
use serde::Serialize;
use crate::receipt::Support;

/// Events emitted by strategies, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StrategyEvent {
    ProposalReceived {
        id: u64,
        timestamp: u64,
    },
    ProposalThresholdUpdated {
        previous: Amount,
        new: Amount,
    },
    VotesDelegated {
        delegator: Address,
        delegatee: Address,
        amount: Amount,
    },
    VotesUndelegated {
        delegator: Address,
        delegatee: Address,
        amount: Amount,
    },
    VoteCast {
        proposal_id: u64,
        voter: Address,
        support: Support,
        weight: Amount,
    },
    ProposalClosed {
        id: u64,
    },
}

/// Audit log. Not queryable state: entries are only appended and read back.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<StrategyEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and mirror it to the trace log.
    pub fn emit(&mut self, event: StrategyEvent) {
        tracing::info!(?event, "strategy event");
        self.entries.push(event);
    }

    /// All events in emission order.
    pub fn entries(&self) -> &[StrategyEvent] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent event.
    pub fn last(&self) -> Option<&StrategyEvent> {
        self.entries.last()
    }
}
