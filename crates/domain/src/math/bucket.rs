use crate::value_objects::interval::Interval;

/// Returns the start of the bucket containing `timestamp`.
///
/// Timestamps are block timestamps in unix seconds and always positive.
pub fn bucket_start(timestamp: u64, interval: Interval) -> u64 {
    timestamp - timestamp % interval.as_secs()
}

/// Returns the first timestamp past the bucket containing `timestamp`.
pub fn bucket_end(timestamp: u64, interval: Interval) -> u64 {
    bucket_start(timestamp, interval) + interval.as_secs()
}
