pub mod candle;
pub mod listing;
pub mod pair;
pub mod token;

// Re-export for easier access
pub use candle::{Candle, CandleKey};
pub use listing::Listing;
pub use pair::{Pair, PairId};
pub use token::Token;
