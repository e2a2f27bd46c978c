//! Arcana numbers and digit-sum reduction
//!
//! Every point of the matrix lives in the arcana space `1..=22`. Larger sums
//! are folded back by repeatedly summing their decimal digits. Exceptions to
//! that rule are data, not code: they come from a `ReductionRules` override
//! table supplied by configuration.

use crate::error::RulesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest arcana number
pub const MAX_ARCANA: u32 = 22;

/// Arcana number in `1..=22`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Arcana(u8);

impl Arcana {
    /// The Fool; zero sums fold onto it
    pub const FOOL: Self = Self(22);

    /// Create an arcana, `None` outside `1..=22`
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(value: u32) -> Option<Self> {
        if value >= 1 && value <= MAX_ARCANA {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    /// Numeric value
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<u32> for Arcana {
    type Error = RulesError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(RulesError::ArcanaOutOfRange(value))
    }
}

impl From<Arcana> for u32 {
    fn from(arcana: Arcana) -> Self {
        arcana.value()
    }
}

impl fmt::Display for Arcana {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sum of decimal digits
#[inline]
#[must_use]
pub fn digit_sum(mut value: u32) -> u32 {
    let mut sum = 0;
    while value > 0 {
        sum += value % 10;
        value /= 10;
    }
    sum
}

/// Fixed output for an inclusive input range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionOverride {
    /// Lowest matching value
    pub min: u32,
    /// Highest matching value
    pub max: u32,
    /// Result for any value in `min..=max`
    pub output: Arcana,
}

impl ReductionOverride {
    /// Create an override, rejecting inverted ranges
    pub fn new(min: u32, max: u32, output: Arcana) -> Result<Self, RulesError> {
        if min > max {
            return Err(RulesError::InvertedRange { min, max });
        }
        Ok(Self { min, max, output })
    }

    /// Check if value is inside the range
    #[inline]
    #[must_use]
    pub fn matches(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Digit-sum reduction with an ordered override table
///
/// Overrides are consulted at every reduction level before the plain rule;
/// the first matching entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ReductionOverride>", into = "Vec<ReductionOverride>")]
pub struct ReductionRules {
    overrides: Vec<ReductionOverride>,
}

impl ReductionRules {
    /// Plain digit-sum reduction
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an override table
    pub fn with_overrides(overrides: Vec<ReductionOverride>) -> Result<Self, RulesError> {
        if let Some(bad) = overrides.iter().find(|o| o.min > o.max) {
            return Err(RulesError::InvertedRange {
                min: bad.min,
                max: bad.max,
            });
        }
        Ok(Self { overrides })
    }

    /// Configured overrides
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> &[ReductionOverride] {
        &self.overrides
    }

    /// Reduce a non-negative integer into the arcana space
    #[must_use]
    pub fn reduce(&self, value: u32) -> Arcana {
        let mut current = value;
        loop {
            if let Some(rule) = self.overrides.iter().find(|o| o.matches(current)) {
                return rule.output;
            }
            if current == 0 {
                return Arcana::FOOL;
            }
            if let Some(arcana) = Arcana::new(current) {
                return arcana;
            }
            current = digit_sum(current);
        }
    }

    /// Reduce the sum of several arcana
    #[inline]
    #[must_use]
    pub fn reduce_sum(&self, parts: &[Arcana]) -> Arcana {
        self.reduce(parts.iter().map(|p| p.value()).sum())
    }
}

impl TryFrom<Vec<ReductionOverride>> for ReductionRules {
    type Error = RulesError;

    fn try_from(overrides: Vec<ReductionOverride>) -> Result<Self, Self::Error> {
        Self::with_overrides(overrides)
    }
}

impl From<ReductionRules> for Vec<ReductionOverride> {
    fn from(rules: ReductionRules) -> Self {
        rules.overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arcana(v: u32) -> Arcana {
        Arcana::new(v).unwrap()
    }

    #[test]
    fn arcana_bounds() {
        assert!(Arcana::new(0).is_none());
        assert!(Arcana::new(23).is_none());
        assert_eq!(Arcana::new(1).map(Arcana::value), Some(1));
        assert_eq!(Arcana::new(22), Some(Arcana::FOOL));
    }

    #[test]
    fn digit_sums() {
        assert_eq!(digit_sum(0), 0);
        assert_eq!(digit_sum(1990), 19);
        assert_eq!(digit_sum(2024), 8);
        assert_eq!(digit_sum(99), 18);
    }

    #[test]
    fn plain_reduction() {
        let rules = ReductionRules::new();
        assert_eq!(rules.reduce(6), arcana(6));
        assert_eq!(rules.reduce(22), arcana(22));
        assert_eq!(rules.reduce(23), arcana(5));
        assert_eq!(rules.reduce(31), arcana(4));
        assert_eq!(rules.reduce(88), arcana(16));
        // 1999 -> 28 -> 10
        assert_eq!(rules.reduce(1999), arcana(10));
        assert_eq!(rules.reduce(0), Arcana::FOOL);
    }

    #[test]
    fn master_values_stay() {
        let rules = ReductionRules::new();
        assert_eq!(rules.reduce(11), arcana(11));
        assert_eq!(rules.reduce(22), arcana(22));
    }

    #[test]
    fn overrides_take_precedence() {
        let rules = ReductionRules::with_overrides(vec![
            ReductionOverride::new(29, 29, arcana(11)).unwrap(),
            ReductionOverride::new(20, 20, arcana(2)).unwrap(),
        ])
        .unwrap();
        assert_eq!(rules.reduce(29), arcana(11));
        // 38 -> 11 via plain digit sum
        assert_eq!(rules.reduce(38), arcana(11));
        assert_eq!(rules.reduce(20), arcana(2));
        assert_eq!(rules.reduce(21), arcana(21));
    }

    #[test]
    fn inverted_override_rejected() {
        assert_eq!(
            ReductionOverride::new(30, 25, arcana(3)),
            Err(RulesError::InvertedRange { min: 30, max: 25 })
        );
    }

    #[test]
    fn rules_deserialize_from_list() {
        let json = r#"[{"min": 23, "max": 23, "output": 5}]"#;
        let rules: ReductionRules = serde_json::from_str(json).unwrap();
        assert_eq!(rules.overrides().len(), 1);

        let bad = r#"[{"min": 23, "max": 23, "output": 40}]"#;
        assert!(serde_json::from_str::<ReductionRules>(bad).is_err());
    }

    #[test]
    fn reduce_sum_adds_then_reduces() {
        let rules = ReductionRules::new();
        assert_eq!(rules.reduce_sum(&[arcana(15), arcana(5), arcana(19)]), arcana(12));
    }
}
