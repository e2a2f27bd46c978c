//! Matrix Points - arcana calculator
//!
//! Pure arithmetic over a birth date:
//! - Validates raw birth input
//! - Reduces sums into the arcana space `1..=22`
//! - Derives octagram, purpose and year points
//! - Resolves the current year point on the 80-year age cycle
//! - Combines two partners into a compatibility matrix
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use matrix_points::{resolve_forecast, BirthInput, PointCalculator};
//!
//! let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
//! let input = BirthInput::parse("1990-05-15", Some("Anna"), today).unwrap();
//!
//! let calculator = PointCalculator::default();
//! let points = calculator.compute(&input);
//! let forecast = resolve_forecast(input.date(), today, &points);
//!
//! assert!(forecast.arcana().is_some());
//! ```

#![warn(unreachable_pub)]

pub mod arcana;
pub mod calculator;
pub mod compatibility;
pub mod error;
pub mod forecast;
pub mod health;
pub mod input;
pub mod point_key;

pub use arcana::{digit_sum, Arcana, ReductionOverride, ReductionRules, MAX_ARCANA};
pub use calculator::{compute_points, PointCalculator, PointSet, Primaries};
pub use error::{LookupError, RulesError, ValidationError, ValidationIssue};
pub use forecast::{
    band_for, cycle_age, precise_age, resolve_forecast, Forecast, ForecastBand, CYCLE_YEARS,
};
pub use health::{Chakra, HealthChart, HealthRow};
pub use input::{title_case, BirthInput};
pub use point_key::{MainPoint, PointKey, Purpose, Segment, YearStep};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with matrix points
    pub use crate::{
        resolve_forecast, Arcana, BirthInput, Forecast, MainPoint, PointCalculator, PointKey,
        PointSet, Purpose, ReductionRules,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
