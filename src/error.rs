//! Error types for Vapormail.

use thiserror::Error;

/// Common error type for Vapormail.
#[derive(Error, Debug)]
pub enum VapormailError {
    /// Requested mailbox lifetime is outside the allowed set.
    #[error("invalid duration: {0} minutes")]
    InvalidDuration(u32),

    /// An active mailbox already exists for the address.
    ///
    /// Statistically unreachable with a properly sized token space; the
    /// store still checks.
    #[error("address already in use: {0}")]
    AddressInUse(String),

    /// No active mailbox for the address (never issued, or already purged).
    #[error("mailbox not found")]
    MailboxNotFound,

    /// No message with the given id in the mailbox.
    #[error("message not found")]
    MessageNotFound,

    /// Address generation failed (entropy source or store failure
    /// during activation).
    #[error("generation failure: {0}")]
    Generation(String),

    /// Validation error for inbound input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Vapormail operations.
pub type Result<T> = std::result::Result<T, VapormailError>;
