//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use ohlcv_api::prelude::*;
//! ```

pub use crate::error::ApiError;
pub use crate::models::{CandleQuery, CandlesResponse, HealthResponse, ListPairsResponse};
pub use crate::routes::router;
pub use crate::server::{ApiServer, ServerConfig};
pub use crate::state::AppState;
