//! Error types for the payment client and flow
//!
//! - `NetworkError`: a backend call failed (transport, timeout, bad reply)
//! - `PaymentError`: the payment flow could not proceed

use matrix_gate::{GateError, StoreError};

/// Longest body excerpt kept in a `NonJson` error
pub const BODY_SNIPPET_CHARS: usize = 200;

/// Backend call failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// Configured backend URL is unusable
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidUrl {
        /// URL as configured
        url: String,
        /// Parser message
        reason: String,
    },

    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Attempt exceeded its deadline
    #[error("request timed out after {after_ms} ms")]
    Timeout {
        /// Deadline that was hit
        after_ms: u64,
    },

    /// Reply was not JSON
    #[error("server returned non-JSON (status {status}): {snippet}")]
    NonJson {
        /// HTTP status code
        status: u16,
        /// Start of the body
        snippet: String,
    },

    /// JSON reply with a non-success status
    #[error("server returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error text from the body, if any
        message: String,
    },

    /// Backend answered `success: false`
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    /// JSON reply did not have the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

impl NetworkError {
    /// Check if a retry may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Build a `NonJson` error, keeping the start of `body`
    #[must_use]
    pub fn non_json(status: u16, body: &str) -> Self {
        Self::NonJson {
            status,
            snippet: body.chars().take(BODY_SNIPPET_CHARS).collect(),
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Payment flow failure
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Backend call failed
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Client storage failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Gate refused the grant
    #[error(transparent)]
    Gate(#[from] GateError),

    /// No payment is waiting for confirmation
    #[error("no payment is pending")]
    NoPendingPayment,

    /// Saved form data could not be encoded or decoded
    #[error("saved calculation data is invalid: {0}")]
    CalcData(#[from] serde_json::Error),
}
