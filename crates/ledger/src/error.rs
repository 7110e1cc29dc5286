//! The module contains the errors the ledger can throw.
//!
//! The errors are:
//!
//! - [`InvalidAmount`] thrown when an amount is zero or negative where a
//!   positive one is required.
//! - [`InvalidCategory`] thrown when an expense has no category.
//! - [`Overflow`] thrown when the balance would leave the `i64` range.
//! - [`Io`] and [`Serialize`] thrown when the ledger file cannot be written.
//!
//!  [`InvalidAmount`]: LedgerError::InvalidAmount
//!  [`InvalidCategory`]: LedgerError::InvalidCategory
//!  [`Overflow`]: LedgerError::Overflow
//!  [`Io`]: LedgerError::Io
//!  [`Serialize`]: LedgerError::Serialize
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Balance overflow")]
    Overflow,
    #[error("ledger write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LedgerError {
    /// Returns `true` when the error comes from the storage layer rather than
    /// from the input.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Serialize(_))
    }
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::Overflow, Self::Overflow) => true,
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Serialize(a), Self::Serialize(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
