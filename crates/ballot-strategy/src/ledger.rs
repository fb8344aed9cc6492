//! Deposit-backed delegation ledger.
//!
//! Delegators deposit governance tokens into the ledger's custody and assign
//! them to a delegatee, whose weight is the sum of deposits assigned to it.
//! Deposits cannot be withdrawn while the delegatee is locked by an active
//! proposal.

use std::collections::HashMap;
use ballot_types::{Address, Amount, BlockNumber};
use crate::context::CallContext;
use crate::error::StrategyError;
use crate::oracle::WeightOracle;
use crate::token::GovernanceToken;

/// Deposits assigned to one delegatee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delegation {
    /// delegator -> deposited amount
    pub deposits_by_delegator: HashMap<Address, Amount>,
    /// Sum of all deposits
    pub total_delegated: Amount,
    /// Block of the last deposit or withdrawal
    pub last_deposit_block: BlockNumber,
    /// Active proposals holding a lock on this delegation
    pub active_proposal_count: u64,
}

impl Delegation {
    /// Amount `delegator` has deposited for this delegatee.
    pub fn deposit_of(&self, delegator: &Address) -> Amount {
        self.deposits_by_delegator
            .get(delegator)
            .copied()
            .unwrap_or(0)
    }

    /// Whether an active proposal holds this delegation.
    pub fn is_locked(&self) -> bool {
        self.active_proposal_count > 0
    }

    /// Sum of per-delegator deposits. Equals `total_delegated` at all times.
    pub fn deposit_sum(&self) -> Option<Amount> {
        self.deposits_by_delegator
            .values()
            .try_fold(0u128, |acc, v| acc.checked_add(*v))
    }
}

/// Delegation ledger keyed by delegatee.
#[derive(Debug)]
pub struct DelegationLedger {
    /// Address holding deposited tokens
    custody: Address,
    delegations: HashMap<Address, Delegation>,
    /// Set while a custody transfer is in flight
    entered: bool,
}

impl DelegationLedger {
    /// Create an empty ledger whose deposits are held by `custody`.
    pub fn new(custody: Address) -> Self {
        Self {
            custody,
            delegations: HashMap::new(),
            entered: false,
        }
    }

    /// Delegation record of `delegatee`, if it ever received a deposit or lock.
    pub fn delegation(&self, delegatee: &Address) -> Option<&Delegation> {
        self.delegations.get(delegatee)
    }

    /// Sum of deposits assigned to `delegatee`.
    pub fn total_delegated(&self, delegatee: &Address) -> Amount {
        self.delegation(delegatee)
            .map(|d| d.total_delegated)
            .unwrap_or(0)
    }

    /// Amount `delegator` has deposited for `delegatee`.
    pub fn deposit_of(&self, delegatee: &Address, delegator: &Address) -> Amount {
        self.delegation(delegatee)
            .map(|d| d.deposit_of(delegator))
            .unwrap_or(0)
    }

    /// Number of active proposals locking `delegatee`.
    pub fn active_proposal_count(&self, delegatee: &Address) -> u64 {
        self.delegation(delegatee)
            .map(|d| d.active_proposal_count)
            .unwrap_or(0)
    }

    /// Iterate over every delegation record.
    pub fn delegations(&self) -> impl Iterator<Item = (&Address, &Delegation)> {
        self.delegations.iter()
    }

    /// Deposit `amount` from the caller and assign it to `delegatee`.
    ///
    /// Deposits are additive: delegating twice to the same delegatee adds
    /// both amounts. Bookkeeping is written before the custody transfer and
    /// rolled back if the transfer fails.
    pub fn delegate<T: GovernanceToken + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        delegatee: Address,
        amount: Amount,
    ) -> Result<(), StrategyError> {
        self.enter()?;
        let result = self.delegate_inner(ctx, token, delegatee, amount);
        self.exit();
        result
    }

    fn delegate_inner<T: GovernanceToken + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        delegatee: Address,
        amount: Amount,
    ) -> Result<(), StrategyError> {
        if amount == 0 {
            return Err(StrategyError::InvalidAmount("cannot delegate zero".to_string()));
        }
        if delegatee.is_zero() {
            return Err(StrategyError::InvalidDelegation("cannot delegate to the zero address".to_string()));
        }

        let delegator = ctx.sender;
        let previous = self.delegations.get(&delegatee).cloned();
        let mut updated = previous.clone().unwrap_or_default();

        let deposit = updated
            .deposit_of(&delegator)
            .checked_add(amount)
            .ok_or(StrategyError::ArithmeticOverflow)?;
        updated.total_delegated = updated
            .total_delegated
            .checked_add(amount)
            .ok_or(StrategyError::ArithmeticOverflow)?;
        updated.deposits_by_delegator.insert(delegator, deposit);
        updated.last_deposit_block = ctx.block_number;

        self.delegations.insert(delegatee, updated);

        if let Err(e) = token.transfer_from(self.custody, delegator, self.custody, amount) {
            tracing::warn!(%delegator, %delegatee, amount, error = %e, "deposit transfer failed, rolling back");
            self.restore(delegatee, previous);
            return Err(e.into());
        }

        tracing::debug!(%delegator, %delegatee, amount, "votes delegated");
        Ok(())
    }

    /// Withdraw `amount` previously deposited by the caller for `delegatee`.
    pub fn undelegate<T: GovernanceToken + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        delegatee: Address,
        amount: Amount,
    ) -> Result<(), StrategyError> {
        self.enter()?;
        let result = self.undelegate_inner(ctx, token, delegatee, amount);
        self.exit();
        result
    }

    fn undelegate_inner<T: GovernanceToken + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        delegatee: Address,
        amount: Amount,
    ) -> Result<(), StrategyError> {
        if amount == 0 {
            return Err(StrategyError::InvalidAmount("cannot undelegate zero".to_string()));
        }

        let delegator = ctx.sender;
        let previous = self.delegations.get(&delegatee).cloned();
        let mut updated = previous.clone().unwrap_or_default();

        if updated.is_locked() {
            return Err(StrategyError::DelegationLocked);
        }

        let available = updated.deposit_of(&delegator);
        if available < amount {
            return Err(StrategyError::InsufficientDelegatedBalance {
                available,
                requested: amount,
            });
        }

        let remaining = available
            .checked_sub(amount)
            .ok_or(StrategyError::ArithmeticUnderflow)?;
        updated.total_delegated = updated
            .total_delegated
            .checked_sub(amount)
            .ok_or(StrategyError::ArithmeticUnderflow)?;
        if remaining == 0 {
            updated.deposits_by_delegator.remove(&delegator);
        } else {
            updated.deposits_by_delegator.insert(delegator, remaining);
        }
        updated.last_deposit_block = ctx.block_number;

        self.delegations.insert(delegatee, updated);

        if let Err(e) = token.transfer(self.custody, delegator, amount) {
            tracing::warn!(%delegator, %delegatee, amount, error = %e, "withdrawal transfer failed, rolling back");
            self.restore(delegatee, previous);
            return Err(e.into());
        }

        tracing::debug!(%delegator, %delegatee, amount, "votes undelegated");
        Ok(())
    }

    /// Check that `lock_for_proposal` would succeed.
    pub(crate) fn ensure_lockable(&self, delegatee: &Address) -> Result<(), StrategyError> {
        self.active_proposal_count(delegatee)
            .checked_add(1)
            .map(|_| ())
            .ok_or(StrategyError::ArithmeticOverflow)
    }

    /// Hold `delegatee`'s deposits in place for the duration of a proposal.
    pub(crate) fn lock_for_proposal(&mut self, delegatee: Address) -> Result<(), StrategyError> {
        self.ensure_lockable(&delegatee)?;
        let delegation = self.delegations.entry(delegatee).or_default();
        delegation.active_proposal_count += 1;
        Ok(())
    }

    /// Release one proposal lock. Unlocking an unlocked delegation is an error.
    pub(crate) fn unlock_after_proposal(&mut self, delegatee: Address) -> Result<(), StrategyError> {
        let delegation = self
            .delegations
            .get_mut(&delegatee)
            .ok_or(StrategyError::ArithmeticUnderflow)?;
        delegation.active_proposal_count = delegation
            .active_proposal_count
            .checked_sub(1)
            .ok_or(StrategyError::ArithmeticUnderflow)?;
        Ok(())
    }

    fn restore(&mut self, delegatee: Address, previous: Option<Delegation>) {
        match previous {
            Some(delegation) => {
                self.delegations.insert(delegatee, delegation);
            }
            None => {
                self.delegations.remove(&delegatee);
            }
        }
    }

    fn enter(&mut self) -> Result<(), StrategyError> {
        if self.entered {
            return Err(StrategyError::Reentrancy);
        }
        self.entered = true;
        Ok(())
    }

    fn exit(&mut self) {
        self.entered = false;
    }
}

impl WeightOracle for DelegationLedger {
    /// Current deposits assigned to `account`. The snapshot point is not
    /// consulted; instead the last deposit or withdrawal must predate the
    /// current block, even when it left the delegation empty.
    fn weight_at(
        &self,
        account: &Address,
        _snapshot_point: BlockNumber,
        ctx: &CallContext,
    ) -> Result<Amount, StrategyError> {
        let Some(delegation) = self.delegation(account) else {
            return Ok(0);
        };

        if delegation.last_deposit_block >= ctx.block_number {
            return Err(StrategyError::StaleSnapshotViolation {
                last_deposit_block: delegation.last_deposit_block,
                current_block: ctx.block_number,
            });
        }

        tracing::debug!(%account, weight = delegation.total_delegated, "delegated weight");
        Ok(delegation.total_delegated)
    }
}
