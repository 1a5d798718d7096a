use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a chain event.
///
/// Ordering is `(block_number, log_index)`, the order in which the chain
/// emitted the events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EventId {
    pub block_number: u64,
    pub log_index: u64,
}

impl EventId {
    #[must_use]
    pub const fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}
