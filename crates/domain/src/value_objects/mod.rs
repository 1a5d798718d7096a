pub mod amount;
pub mod event_id;
pub mod interval;

pub use amount::Amount;
pub use event_id::EventId;
pub use interval::Interval;
