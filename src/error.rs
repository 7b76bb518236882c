//! Failure taxonomy for lifecycle operations
//!
//! Every core operation returns a discriminated result; the hosting gateway
//! maps each variant to an ephemeral user-facing message. Notification
//! delivery failures are deliberately absent here: they are logged and
//! reported through [`crate::notify::DeliveryReport`] and never fail a
//! committed transition.

/// Errors surfaced to the acting user by lifecycle operations.
#[derive(thiserror::Error, Debug)]
pub enum LifecycleError {
    #[error("record {0} not found")]
    NotFound(String),
    #[error("not authorized: {0}")]
    Forbidden(String),
    #[error("{action} is not allowed while the record is {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },
    #[error("invoice amount must be greater than zero")]
    InvalidAmount,
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence failures. Fatal for the operation that hit them: a transition
/// is only reported committed once the store write returned successfully.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store io failure: {0}")]
    Io(#[from] sled::Error),
    #[error("record {id} already exists")]
    DuplicateId { id: String },
    #[error("stored record {id} could not be decoded: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("record could not be encoded: {0}")]
    Encode(String),
}

/// Identifier generation failures.
#[derive(thiserror::Error, Debug)]
pub enum IdError {
    #[error("invalid id prefix: {0}")]
    Prefix(#[from] bech32::primitives::hrp::Error),
    #[error("failed to encode id: {0}")]
    Encode(#[from] bech32::EncodeError),
}
