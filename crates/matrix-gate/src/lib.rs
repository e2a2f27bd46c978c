//! Matrix Gate - premium access control
//!
//! Binds a confirmed payment to exactly one displayed matrix:
//! - `MatrixKey` identifies the report from its normalised inputs
//! - `PremiumGrantRecord` is the persisted proof of payment
//! - `PremiumGate` validates transitions and resets stale grants
//! - `ClientStore` abstracts the key/value persistence
//!
//! # Example
//!
//! ```rust
//! use matrix_gate::{GateState, MatrixInputs, MatrixKey, MemoryStore, PremiumGate, PremiumGrantRecord};
//!
//! let key = MatrixKey::build(&MatrixInputs::Personal { date: "1990-05-15", name: "Anna" });
//! let mut gate = PremiumGate::new(MemoryStore::new());
//! assert_eq!(gate.state(), GateState::Locked);
//!
//! gate.unlock(&PremiumGrantRecord::paid("pay-1", key.clone())).unwrap();
//! assert!(gate.is_unlocked(&key));
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod gate;
pub mod grant;
pub mod key;
pub mod store;

pub use error::{GateError, StateError, StoreError};
pub use gate::{PremiumGate, GRANT_KEYS};
pub use grant::{
    allowed_transitions, is_premium_unlocked, validate_transition, GateState, GrantState,
    PremiumGrantRecord, PAID_STATUS,
};
pub use key::{MatrixInputs, MatrixKey, ServiceType};
pub use store::{ClientStore, JsonFileStore, MemoryStore, StorageKey};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
