//! Execution context of the transaction being applied.

use ballot_types::{Address, BlockNumber};
use crate::error::StrategyError;

/// Caller and block of the current call.
///
/// Every state-changing entry point receives one of these; it plays the role
/// of the host chain's sender and block environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Transaction sender
    pub sender: Address,
    /// Height of the block being executed
    pub block_number: BlockNumber,
    /// Block timestamp (seconds)
    pub timestamp: u64,
}

impl CallContext {
    /// Context for `sender` at `block_number`, timestamp zero.
    pub fn new(sender: Address, block_number: BlockNumber) -> Self {
        Self {
            sender,
            block_number,
            timestamp: 0,
        }
    }

    /// Set the block timestamp.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Same block, different sender.
    pub fn as_sender(&self, sender: Address) -> Self {
        Self { sender, ..*self }
    }

    /// The most recent finalized block.
    pub fn prior_block(&self) -> Result<BlockNumber, StrategyError> {
        self.block_number
            .checked_sub(1)
            .ok_or(StrategyError::ArithmeticUnderflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prior_block() {
        let ctx = CallContext::new(Address::from_low_u64(1), 10);
        assert_eq!(ctx.prior_block(), Ok(9));

        let genesis = CallContext::new(Address::from_low_u64(1), 0);
        assert_eq!(genesis.prior_block(), Err(StrategyError::ArithmeticUnderflow));
    }

    #[test]
    fn test_as_sender_keeps_block() {
        let ctx = CallContext::new(Address::from_low_u64(1), 10).with_timestamp(60);
        let other = ctx.as_sender(Address::from_low_u64(2));
        assert_eq!(other.block_number, 10);
        assert_eq!(other.timestamp, 60);
        assert_eq!(other.sender, Address::from_low_u64(2));
    }
}
