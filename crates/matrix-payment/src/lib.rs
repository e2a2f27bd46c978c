//! Matrix Payment - payment backend client and unlock flow
//!
//! - `PaymentBackend`: create-payment, check-payment and health calls
//! - `HttpPaymentClient`: JSON-only HTTP implementation with bounded retries
//! - `RetryPolicy`: backoff and per-attempt deadline
//! - `PaymentFlow`: binds a payment to one matrix key and unlocks the gate
//!
//! # Example
//!
//! ```rust,no_run
//! use matrix_gate::{MatrixInputs, MatrixKey, MemoryStore, PremiumGate};
//! use matrix_payment::{HttpPaymentClient, PaymentFlow, PaymentOutcome, RetryPolicy, DEFAULT_BASE_URL};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpPaymentClient::new(DEFAULT_BASE_URL, RetryPolicy::default())?;
//! let mut flow = PaymentFlow::new(client, PremiumGate::new(MemoryStore::new()));
//!
//! let key = MatrixKey::build(&MatrixInputs::Personal { date: "1990-05-15", name: "Anna" });
//! if let PaymentOutcome::Unlocked(_) = flow.complete(&key).await? {
//!     println!("premium unlocked");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod client;
pub mod error;
pub mod flow;
pub mod retry;
pub mod types;

pub use client::{HttpPaymentClient, PaymentBackend, DEFAULT_BASE_URL, IDEMPOTENCE_HEADER};
pub use error::{NetworkError, PaymentError, BODY_SNIPPET_CHARS};
pub use flow::{PaymentFlow, PaymentOutcome, PENDING_KEYS};
pub use retry::RetryPolicy;
pub use types::{
    CalcData, CheckPaymentResponse, CreatePaymentRequest, CreatePaymentResponse, HealthResponse,
    PaymentCreated, PaymentStatus, UserData,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
