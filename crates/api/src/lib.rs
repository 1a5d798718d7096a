//! Read-only HTTP API over the candle store.
//!
//! Endpoints:
//! - `GET /health`: liveness and indexing cursor
//! - `GET /pairs`: registered pairs
//! - `GET /pairs/{id}/candles?interval=1h&limit=100`: latest candles

/// Prelude module for convenient imports.
pub mod prelude;

/// Error types.
pub mod error;
/// Request handlers.
pub mod handlers;
/// API request/response models.
pub mod models;
/// Route definitions.
pub mod routes;
/// Server configuration and startup.
pub mod server;
/// Application state.
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use server::{ApiServer, ServerConfig};
pub use state::AppState;
