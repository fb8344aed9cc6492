//! Ballot Strategy - Vote-weight and proposal-voting strategies.
//!
//! A strategy sits between a proposal-lifecycle module and a governance
//! token. It decides who may propose, how much each vote weighs, and whether
//! a voter has already voted.
//!
//! This crate provides:
//! - Proposal intake with a strict, owner-mutable proposal threshold
//! - Receipts enforcing one vote per voter per proposal
//! - Direct and Ed25519-signed votes
//! - A snapshot strategy reading token checkpoints
//! - A deposit-delegation strategy with proposal locks
//! - TOML configuration

pub mod auth;
pub mod config;
pub mod context;
pub mod deposit;
pub mod error;
pub mod events;
pub mod intake;
pub mod ledger;
pub mod oracle;
pub mod receipt;
pub mod sink;
pub mod snapshot;
pub mod strategy;
pub mod token;

pub use auth::{SignedVote, VoteAuthenticator};
pub use config::StrategyConfig;
pub use context::CallContext;
pub use deposit::DepositDelegationStrategy;
pub use error::{StrategyError, TokenError};
pub use events::{EventLog, StrategyEvent};
pub use intake::{Proposal, ProposalIntake};
pub use ledger::{Delegation, DelegationLedger};
pub use oracle::{SnapshotOracle, WeightOracle};
pub use receipt::{Receipt, ReceiptStore, Support, MAX_WEIGHT};
pub use sink::{ProposalTally, Tally, VoteSink};
pub use snapshot::SnapshotStrategy;
pub use strategy::{ProposalVotingStrategy, StrategyCore};
pub use token::{Checkpoint, CheckpointToken, GovernanceToken};
