//! Indexer configuration.
//!
//! The indexer takes an explicit [`IndexerConfig`]: the network it follows,
//! the block it starts from, the contracts it listens to, a token catalog
//! with decimals, the candle intervals to maintain and how pairs are keyed.

use ohlcv_domain::math::decimal::MAX_DECIMALS;
use ohlcv_domain::{Address, ChainEvent, Interval, Token};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How trades are grouped into pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairKeyStrategy {
    /// One pair per unordered token combination, whatever contract traded it.
    #[default]
    SortedTokens,
    /// One pair per emitting pool contract. Marketplace purchases always
    /// key by tokens, since one marketplace lists many assets.
    Contract,
}

/// A catalog entry for a token the indexer may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token contract address.
    pub address: Address,
    /// Decimal places of the token's raw amounts.
    pub decimals: u8,
    /// Ticker, display only.
    #[serde(default)]
    pub symbol: Option<String>,
}

impl TokenConfig {
    pub fn to_token(&self) -> Token {
        let token = Token::new(self.address.clone(), self.decimals);
        match &self.symbol {
            Some(symbol) => token.with_symbol(symbol.clone()),
            None => token,
        }
    }
}

/// Configuration for the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Network name, used in logs.
    pub network: String,
    /// Events from earlier blocks are ignored.
    pub start_block: u64,
    /// Contracts whose events are indexed. Empty means all contracts.
    pub contracts: Vec<Address>,
    /// Token catalog.
    pub tokens: Vec<TokenConfig>,
    /// Candle intervals maintained for every pair.
    pub intervals: Vec<Interval>,
    /// Pair identity strategy.
    pub pair_key: PairKeyStrategy,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            network: "mainnet".to_string(),
            start_block: 0,
            contracts: Vec::new(),
            tokens: Vec::new(),
            intervals: Interval::DEFAULT_SET.to_vec(),
            pair_key: PairKeyStrategy::default(),
        }
    }
}

impl IndexerConfig {
    /// Loads and validates a JSON configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// Returns an error if the document cannot be parsed or validated.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for contradictions.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intervals.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one interval is required".to_string(),
            ));
        }

        let mut intervals = HashSet::new();
        for interval in &self.intervals {
            if !intervals.insert(interval) {
                return Err(ConfigError::Invalid(format!(
                    "interval {interval} listed twice"
                )));
            }
        }

        let mut addresses = HashSet::new();
        for token in &self.tokens {
            if token.decimals > MAX_DECIMALS {
                return Err(ConfigError::Invalid(format!(
                    "token {} has {} decimals, at most {MAX_DECIMALS} are supported",
                    token.address, token.decimals
                )));
            }
            if !addresses.insert(&token.address) {
                return Err(ConfigError::Invalid(format!(
                    "token {} listed twice",
                    token.address
                )));
            }
        }

        Ok(())
    }

    /// Whether an event is in scope: at or after `start_block` and emitted by
    /// a tracked contract.
    pub fn accepts(&self, event: &ChainEvent) -> bool {
        event.block_number() >= self.start_block
            && (self.contracts.is_empty() || self.contracts.contains(event.address()))
    }
}
