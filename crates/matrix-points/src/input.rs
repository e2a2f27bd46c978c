//! Birth input validation
//!
//! Raw form values are validated here, before any point is calculated. Every
//! violated rule is collected so the caller can show them all at once.

use crate::error::{ValidationError, ValidationIssue};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Oldest accepted birth year, counted back from the reference year
pub const MAX_AGE_YEARS: i32 = 120;

/// Date format produced by HTML date inputs
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Letters (Cyrillic, then Latin), dash and space
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[а-яё\- ]*[a-z\- ]*$").expect("name pattern compiles"));

/// Validated birth data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthInput {
    date: NaiveDate,
    name: Option<String>,
}

impl BirthInput {
    /// Validate raw field values
    ///
    /// `name` is `None` for inputs that carry no name (compatibility
    /// partners); `Some("")` is an empty required field.
    ///
    /// # Errors
    /// `ValidationError` listing every violated rule.
    pub fn parse(date: &str, name: Option<&str>, today: NaiveDate) -> Result<Self, ValidationError> {
        let parsed = NaiveDate::parse_from_str(date.trim(), INPUT_DATE_FORMAT).ok();
        Self::check(parsed, name, today)
    }

    /// Validate an already parsed date
    ///
    /// # Errors
    /// `ValidationError` listing every violated rule.
    pub fn from_date(
        date: NaiveDate,
        name: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        Self::check(Some(date), name, today)
    }

    fn check(
        date: Option<NaiveDate>,
        name: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();
        let name = name.map(str::trim);

        if date.is_none() || name.is_some_and(str::is_empty) {
            issues.push(ValidationIssue::MissingOrUnparsable);
        }
        if let Some(date) = date {
            if date > today {
                issues.push(ValidationIssue::FutureDate);
            }
            if today.year() - date.year() > MAX_AGE_YEARS {
                issues.push(ValidationIssue::TooFarInPast);
            }
        }
        if let Some(name) = name {
            if !NAME_PATTERN.is_match(name) {
                issues.push(ValidationIssue::InvalidName);
            }
        }

        match date {
            Some(date) if issues.is_empty() => Ok(Self {
                date,
                name: name.map(str::to_string),
            }),
            _ => {
                tracing::debug!(?issues, "birth input rejected");
                Err(ValidationError::new(issues))
            }
        }
    }

    /// Birth date
    #[inline]
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Day of month (1..=31)
    #[inline]
    #[must_use]
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// Month (1..=12)
    #[inline]
    #[must_use]
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Calendar year
    #[inline]
    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Trimmed name, if the input carries one
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Date in the input format (`YYYY-MM-DD`)
    #[must_use]
    pub fn iso_date(&self) -> String {
        self.date.format(INPUT_DATE_FORMAT).to_string()
    }

    /// Date as shown in reports (`DD.MM.YYYY`)
    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.format("%d.%m.%Y").to_string()
    }

    /// Name with each word and dash-separated part capitalised
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.name.as_deref().map(title_case)
    }
}

/// Capitalise the first letter and every letter following a dash or space
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut capitalise = true;
    for ch in text.chars() {
        if capitalise {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        capitalise = ch == '-' || ch == ' ';
    }
    out
}
