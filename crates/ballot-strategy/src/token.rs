//! Governance token ledger boundary.
//!
//! Strategies never own balances. They read historical voting power and move
//! custody through the `GovernanceToken` trait. `CheckpointToken` is an
//! in-memory ledger that records a checkpoint per balance change, so prior
//! voting power can be looked up by block.

use std::collections::HashMap;
use ballot_types::{Address, Amount, BlockNumber};
use crate::error::TokenError;

/// Operations a strategy needs from the governance token.
pub trait GovernanceToken {
    /// Current balance of `account`.
    fn balance_of(&self, account: &Address) -> Amount;

    /// Voting power of `account` as of the end of `block`.
    ///
    /// Fails for any block that is not yet final.
    fn prior_votes(&self, account: &Address, block: BlockNumber) -> Result<Amount, TokenError>;

    /// Move `amount` from `from` to `to`, where `from` is the caller.
    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` using `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError>;
}

/// Voting power of an account from `from_block` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub from_block: BlockNumber,
    pub votes: Amount,
}

/// In-memory governance token with per-block checkpoints.
#[derive(Debug, Default)]
pub struct CheckpointToken {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    checkpoints: HashMap<Address, Vec<Checkpoint>>,
    total_supply: Amount,
    current_block: BlockNumber,
}

impl CheckpointToken {
    /// Create an empty token at block 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the ledger currently executes in.
    pub fn current_block(&self) -> BlockNumber {
        self.current_block
    }

    /// Move the ledger's clock forward. Checkpoints written afterwards are
    /// stamped with the new block.
    pub fn advance_to(&mut self, block: BlockNumber) {
        if block > self.current_block {
            self.current_block = block;
        }
    }

    /// Sum of all minted tokens.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Credit `amount` new tokens to `to`.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<(), TokenError> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self.balance_of(&to);
        self.set_balance(to, balance + amount);
        Ok(())
    }

    /// Let `spender` move up to `amount` of `owner`'s tokens.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Remaining amount `spender` may move for `owner`.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Checkpoint history of an account, oldest first.
    pub fn checkpoints(&self, account: &Address) -> &[Checkpoint] {
        self.checkpoints
            .get(account)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn set_balance(&mut self, account: Address, balance: Amount) {
        self.balances.insert(account, balance);
        self.write_checkpoint(account, balance);
    }

    fn write_checkpoint(&mut self, account: Address, votes: Amount) {
        let block = self.current_block;
        let history = self.checkpoints.entry(account).or_default();
        match history.last_mut() {
            Some(last) if last.from_block == block => last.votes = votes,
            _ => history.push(Checkpoint { from_block: block, votes }),
        }
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                available: from_balance,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        // Bounded by total supply, so cannot overflow.
        let to_balance = self.balance_of(&to);
        self.set_balance(from, from_balance - amount);
        self.set_balance(to, to_balance + amount);
        Ok(())
    }
}

impl GovernanceToken for CheckpointToken {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn prior_votes(&self, account: &Address, block: BlockNumber) -> Result<Amount, TokenError> {
        if block >= self.current_block {
            return Err(TokenError::NotYetDetermined {
                block,
                current: self.current_block,
            });
        }

        let history = self.checkpoints(account);
        let idx = history.partition_point(|cp| cp.from_block <= block);
        Ok(match idx {
            0 => 0,
            n => history[n - 1].votes,
        })
    }

    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let approved = self.allowance(&from, &spender);
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                approved,
                requested: amount,
            });
        }
        self.move_balance(from, to, amount)?;
        self.allowances.insert((from, spender), approved - amount);
        Ok(())
    }
}
