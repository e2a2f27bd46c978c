//! Error types for the point calculator
//!
//! - `ValidationError`: birth input rejected before any calculation runs
//! - `LookupError`: a derived value could not be resolved (no forecast band)
//! - `RulesError`: malformed reduction override table

/// A single rule violated by a birth input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    /// Date could not be parsed or a required field is empty
    #[error("Date is not valid or one of the fields is empty.")]
    MissingOrUnparsable,

    /// Birth date lies after the reference date
    #[error("Date can't be in the future.")]
    FutureDate,

    /// Birth year is more than the allowed number of years back
    #[error("Date can't be so far in the past.")]
    TooFarInPast,

    /// Name contains characters other than letters, dash and space
    #[error(
        "Name format is incorrect: allowed characters are letters, dash and space. \
         Example: Anna, Anna-Maria, Anna Maria."
    )]
    InvalidName,
}

/// Birth input rejected; carries every violated rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid birth input: {}", render_issues(.issues))]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Create from a non-empty list of issues
    #[inline]
    #[must_use]
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Violated rules in the order they were checked
    #[inline]
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Check whether a specific rule was violated
    #[inline]
    #[must_use]
    pub fn has(&self, issue: &ValidationIssue) -> bool {
        self.issues.contains(issue)
    }
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lookup failures; callers degrade to placeholder content
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    /// Cycle age falls into a gap of the band table
    #[error("no forecast band covers cycle age {cycle_age:.3}")]
    NoForecastBand {
        /// Age within the 80-year cycle
        cycle_age: f64,
    },

    /// Point name not recognised
    #[error("unknown point key: {0}")]
    UnknownPointKey(String),

    /// Point is not part of this point set (e.g. `union` on a personal matrix)
    #[error("point {0} is not present in this matrix")]
    MissingPoint(String),
}

/// Reduction override table errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// Range bounds are inverted
    #[error("override range is inverted: {min} > {max}")]
    InvertedRange {
        /// Lower bound
        min: u32,
        /// Upper bound
        max: u32,
    },

    /// Value outside the arcana space 1..=22
    #[error("arcana value out of range: {0}")]
    ArcanaOutOfRange(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_issue() {
        let err = ValidationError::new(vec![
            ValidationIssue::FutureDate,
            ValidationIssue::InvalidName,
        ]);
        let text = err.to_string();
        assert!(text.contains("future"));
        assert!(text.contains("Name format"));
        assert!(err.has(&ValidationIssue::FutureDate));
        assert!(!err.has(&ValidationIssue::TooFarInPast));
    }

    #[test]
    fn lookup_error_display() {
        let err = LookupError::NoForecastBand { cycle_age: 5.75 };
        assert_eq!(err.to_string(), "no forecast band covers cycle age 5.750");
    }
}
