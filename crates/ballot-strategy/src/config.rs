//! Strategy configuration.
//!
//! Loaded from TOML. Addresses are Bech32m strings; token amounts are decimal
//! strings since TOML integers stop at 64 bits.

use std::path::Path;
use ballot_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use crate::error::StrategyError;

/// Construction-time parameters of a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Domain name bound into signed ballots
    pub name: String,
    /// Chain id bound into signed ballots
    pub chain_id: u64,
    /// Weight a proposer must strictly exceed. Owner-mutable afterwards.
    #[serde(with = "amount_string")]
    pub proposal_threshold: Amount,
    /// Voting period in blocks, reported to the lifecycle module
    pub voting_period: u64,
    /// Governance token (immutable)
    pub token: Address,
    /// Owner allowed to change the threshold
    pub owner: Address,
    /// Lifecycle module allowed to submit and close proposals
    pub lifecycle_module: Address,
    /// Address of the strategy itself; holds deposits in the delegation model
    pub strategy_address: Address,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::devnet()
    }
}

impl StrategyConfig {
    /// Local development configuration with well-known addresses.
    pub fn devnet() -> Self {
        Self {
            name: "Ballot".to_string(),
            chain_id: 1337,
            proposal_threshold: 0,
            voting_period: 100_800, // ~1 week at 6s blocks
            token: Address::from_low_u64(0x70c3),
            owner: Address::from_low_u64(0x0a11),
            lifecycle_module: Address::from_low_u64(0x11fe),
            strategy_address: Address::from_low_u64(0x5747),
        }
    }

    /// Replace the proposal threshold.
    pub fn with_threshold(mut self, threshold: Amount) -> Self {
        self.proposal_threshold = threshold;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, StrategyError> {
        let config: StrategyConfig =
            toml::from_str(contents).map_err(|e| StrategyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty-printed TOML.
    pub fn to_toml_string(&self) -> Result<String, StrategyError> {
        toml::to_string_pretty(self).map_err(|e| StrategyError::Config(e.to_string()))
    }

    /// Load configuration from file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config = Self::from_toml_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn to_file(&self, path: &Path) -> anyhow::Result<()> {
        let contents = self.to_toml_string()?;
        std::fs::write(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e))?;
        Ok(())
    }

    /// Check required fields and reject zero addresses.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.name.is_empty() {
            return Err(StrategyError::Config("name cannot be empty".to_string()));
        }
        if self.voting_period == 0 {
            return Err(StrategyError::Config("voting period cannot be 0".to_string()));
        }

        let addresses = [
            ("token", self.token),
            ("owner", self.owner),
            ("lifecycle_module", self.lifecycle_module),
            ("strategy_address", self.strategy_address),
        ];
        for (field, address) in addresses {
            if address.is_zero() {
                return Err(StrategyError::Config(format!("{} cannot be the zero address", field)));
            }
        }

        Ok(())
    }
}

mod amount_string {
    use ballot_types::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Amount>().map_err(serde::de::Error::custom)
    }
}
