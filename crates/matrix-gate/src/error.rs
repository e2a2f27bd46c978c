//! Error types for the premium gate
//!
//! - `StateError`: grant record does not authorise the current matrix
//! - `StoreError`: client storage could not be read or written
//! - `GateError`: either of the above, returned by gate operations

use crate::grant::GrantState;

/// Grant state problems; the gate resolves these by locking
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Stored grant belongs to another matrix
    #[error("grant key {stored:?} does not match current key {current:?}")]
    KeyMismatch {
        /// Key recorded with the grant
        stored: String,
        /// Key of the matrix on screen
        current: String,
    },

    /// Grant exists but its status is not `paid`
    #[error("grant status is {0:?}, expected \"paid\"")]
    NotPaid(String),

    /// Grant fields are missing or inconsistent
    #[error("corrupt grant record: {0}")]
    CorruptRecord(String),

    /// Transition not in the allowed table
    #[error("illegal gate transition {from} -> {to}")]
    IllegalTransition {
        /// Current state
        from: GrantState,
        /// Requested state
        to: GrantState,
    },
}

/// Client storage failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing file could not be read or written
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file is not a JSON string map
    #[error("storage file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    /// Stored value could not be decoded
    #[error("stored value for {key} is invalid: {reason}")]
    InvalidValue {
        /// Storage key
        key: String,
        /// What was wrong
        reason: String,
    },
}

/// Gate operation failure
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Grant state problem
    #[error(transparent)]
    State(#[from] StateError),

    /// Storage problem
    #[error(transparent)]
    Store(#[from] StoreError),
}
