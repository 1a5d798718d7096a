//! Fixed-point and bucketing helpers.

/// Floor-aligned time buckets.
pub mod bucket;
/// Conversion of raw on-chain amounts into decimals.
pub mod decimal;

pub use bucket::{bucket_end, bucket_start};
pub use decimal::{from_decimal, max, min, ratio, to_decimal};
