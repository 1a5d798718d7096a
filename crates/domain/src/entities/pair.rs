use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a trading pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(String);

impl PairId {
    /// Key derived from the two token addresses, independent of argument order.
    pub fn for_tokens(a: &Address, b: &Address) -> Self {
        let (token0, token1) = sort_tokens(a, b);
        Self(format!("{token0}-{token1}"))
    }

    /// Key equal to the pool or treasury contract that holds the pair.
    pub fn for_contract(contract: &Address) -> Self {
        Self(contract.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PairId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Orders two token addresses the way pairs store them.
pub fn sort_tokens<'a>(a: &'a Address, b: &'a Address) -> (&'a Address, &'a Address) {
    if a <= b { (a, b) } else { (b, a) }
}

/// A tradable combination of two tokens. Prices are quoted in token1 per token0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub id: PairId,
    pub token0: Address,
    pub token1: Address,
    /// Block timestamp of the first trade.
    pub created_at: u64,
    pub created_block: u64,
}

impl Pair {
    pub fn new(
        id: PairId,
        token_a: &Address,
        token_b: &Address,
        created_at: u64,
        created_block: u64,
    ) -> Self {
        let (token0, token1) = sort_tokens(token_a, token_b);
        Self {
            id,
            token0: token0.clone(),
            token1: token1.clone(),
            created_at,
            created_block,
        }
    }

    /// Whether the pair is made of exactly these two tokens, in any order.
    pub fn has_tokens(&self, a: &Address, b: &Address) -> bool {
        let (token0, token1) = sort_tokens(a, b);
        &self.token0 == token0 && &self.token1 == token1
    }
}
