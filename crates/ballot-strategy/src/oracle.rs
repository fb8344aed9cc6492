//! Voting weight lookups.

use ballot_types::{Address, Amount, BlockNumber};
use crate::context::CallContext;
use crate::error::{StrategyError, TokenError};
use crate::token::GovernanceToken;

/// "Voting power of `account` as of `snapshot_point`".
///
/// Implementations are read-only and deterministic for a given ledger state
/// and call context.
pub trait WeightOracle {
    fn weight_at(
        &self,
        account: &Address,
        snapshot_point: BlockNumber,
        ctx: &CallContext,
    ) -> Result<Amount, StrategyError>;
}

/// Weight from the governance token's checkpoint history.
#[derive(Debug)]
pub struct SnapshotOracle<'a, T: ?Sized> {
    token: &'a T,
}

impl<'a, T: GovernanceToken + ?Sized> SnapshotOracle<'a, T> {
    /// Wrap a token ledger.
    pub fn new(token: &'a T) -> Self {
        Self { token }
    }
}

impl<T: GovernanceToken + ?Sized> WeightOracle for SnapshotOracle<'_, T> {
    fn weight_at(
        &self,
        account: &Address,
        snapshot_point: BlockNumber,
        ctx: &CallContext,
    ) -> Result<Amount, StrategyError> {
        if snapshot_point >= ctx.block_number {
            return Err(StrategyError::SnapshotNotFinalized {
                snapshot: snapshot_point,
                current: ctx.block_number,
            });
        }

        let weight = self
            .token
            .prior_votes(account, snapshot_point)
            .map_err(|e| match e {
                TokenError::NotYetDetermined { block, current } => {
                    StrategyError::SnapshotNotFinalized { snapshot: block, current }
                }
                other => StrategyError::Token(other),
            })?;

        tracing::debug!(%account, snapshot_point, weight, "snapshot weight");
        Ok(weight)
    }
}
