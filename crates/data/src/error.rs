/// Errors raised by a store.
///
/// All of them are retryable from the pipeline's point of view: a failed
/// commit leaves the store untouched, so the same event can be delivered again.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored row cannot be mapped back to an entity.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    /// The store cannot be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
