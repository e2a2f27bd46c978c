//! Matrix CLI - command line front end
//!
//! Wires the workspace crates together:
//! - `config`: TOML configuration with environment overrides
//! - `report`: personal and compatibility reports behind the premium gate
//! - `checkout`: payment start, confirmation and status
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```rust
//! use matrix_cli::config::MatrixConfig;
//! use matrix_cli::report::Reporter;
//! use matrix_gate::{MemoryStore, PremiumGate};
//! use chrono::NaiveDate;
//!
//! let reporter = Reporter::from_config(&MatrixConfig::default()).unwrap();
//! let mut gate = PremiumGate::new(MemoryStore::new());
//! let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
//!
//! let output = reporter.personal(&mut gate, "1990-05-15", "Anna", today).unwrap();
//! assert!(!output.unlocked);
//! ```

#![warn(unreachable_pub)]

pub mod checkout;
pub mod config;
pub mod logging;
pub mod report;

pub use checkout::{confirm, describe_outcome, key_for, pay, PayTarget, StatusOutput};
pub use config::{ConfigError, MatrixConfig, BACKEND_URL_ENV, DEFAULT_CONFIG_FILE};
pub use report::{ReportOutput, Reporter};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
