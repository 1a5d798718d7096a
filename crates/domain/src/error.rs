//! Domain-level errors.

/// Errors raised by value parsing and fixed-point arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Address is not `0x` followed by 40 hex digits.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    /// Token decimals exceed what a decimal value can carry.
    #[error("Unsupported decimals: {0} (max 28)")]
    UnsupportedDecimals(u8),
    /// Integer part of an amount does not fit a decimal value.
    #[error("Amount {0} does not fit a decimal value")]
    AmountOverflow(String),
    /// Amount string is not a non-negative integer.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// Division by a zero amount.
    #[error("Division by zero")]
    DivisionByZero,
    /// Interval label or length is not part of the supported set.
    #[error("Unknown interval: {0}")]
    UnknownInterval(String),
    /// Purchase exceeds what is left on a listing.
    #[error("Listing {listing} has {remaining} left, purchase requested {requested}")]
    ListingExhausted {
        /// Listing identifier.
        listing: String,
        /// Quantity still available.
        remaining: String,
        /// Quantity requested by the purchase.
        requested: String,
    },
}
