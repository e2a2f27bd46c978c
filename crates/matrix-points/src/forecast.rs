//! Age-cycle forecast
//!
//! A precise age is folded into an 80-year cycle and looked up in a fixed
//! table of age bands. The table is kept exactly as published, overlaps and
//! gaps included: bands are checked in listed order, the first band whose
//! `[min, max)` range contains the age wins, and ages that fall into a gap
//! resolve to `Forecast::NoMatch`.

use crate::arcana::Arcana;
use crate::calculator::PointSet;
use crate::error::LookupError;
use crate::point_key::{PointKey, Segment, YearStep};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Length of one forecast cycle in years
pub const CYCLE_YEARS: f64 = 80.0;

/// Age band selecting one year point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastBand {
    /// Inclusive lower bound, years
    pub min: f64,
    /// Exclusive upper bound, years
    pub max: f64,
    /// Selected point
    pub key: PointKey,
}

impl ForecastBand {
    const fn new(min: f64, max: f64, segment: Segment, step: YearStep) -> Self {
        Self {
            min,
            max,
            key: PointKey::Year(segment, step),
        }
    }

    /// Check if `age` is inside `[min, max)`
    #[inline]
    #[must_use]
    pub fn contains(&self, age: f64) -> bool {
        age >= self.min && age < self.max
    }
}

macro_rules! segment_bands {
    ($segment:expr, $base:literal) => {
        [
            ForecastBand::new($base - 1.0, $base + 0.5, $segment, YearStep::Start),
            ForecastBand::new($base + 1.0, $base + 2.5, $segment, YearStep::Two),
            ForecastBand::new($base + 2.5, $base + 3.5, $segment, YearStep::One),
            ForecastBand::new($base + 3.5, $base + 4.0, $segment, YearStep::Three),
            ForecastBand::new($base + 4.0, $base + 5.5, $segment, YearStep::Four),
            ForecastBand::new($base + 6.0, $base + 7.5, $segment, YearStep::Five),
            ForecastBand::new($base + 7.5, $base + 8.5, $segment, YearStep::Four),
            ForecastBand::new($base + 8.5, $base + 9.0, $segment, YearStep::Six),
        ]
    };
}

use Segment::{Af, Bg, Ci, Dh, Fb, Gc, Ha, Id};
use YearStep::{Five, Four, One, Six, Start, Three, Two};

static AF_BANDS: [ForecastBand; 8] = [
    ForecastBand::new(0.0, 1.5, Af, Start),
    ForecastBand::new(1.0, 2.5, Af, Two),
    ForecastBand::new(2.5, 3.5, Af, One),
    ForecastBand::new(3.5, 4.0, Af, Three),
    ForecastBand::new(4.0, 5.5, Af, Four),
    ForecastBand::new(6.0, 7.5, Af, Five),
    ForecastBand::new(7.5, 8.5, Af, Four),
    ForecastBand::new(8.5, 9.0, Af, Six),
];

static SEGMENT_BANDS: [[ForecastBand; 8]; 7] = [
    segment_bands!(Fb, 10.0),
    segment_bands!(Bg, 20.0),
    segment_bands!(Gc, 30.0),
    segment_bands!(Ci, 40.0),
    segment_bands!(Id, 50.0),
    segment_bands!(Dh, 60.0),
    segment_bands!(Ha, 70.0),
];

static CYCLE_END: ForecastBand = ForecastBand::new(79.0, 80.0, Af, Start);

/// Number of bands in one cycle
pub const BAND_COUNT: usize = 65;

/// Every band of one cycle, in lookup order
pub fn bands() -> impl Iterator<Item = &'static ForecastBand> {
    AF_BANDS
        .iter()
        .chain(SEGMENT_BANDS.iter().flatten())
        .chain(std::iter::once(&CYCLE_END))
}

/// First band containing `cycle_age`
#[must_use]
pub fn band_for(cycle_age: f64) -> Option<&'static ForecastBand> {
    bands().find(|band| band.contains(cycle_age))
}

/// Age in fractional years
///
/// Whole years and months are counted from `birth` to `today`; the remaining
/// days count as a fraction of the month they run through. When `today`'s
/// day precedes the birth day, the days borrow from the month preceding
/// `today` and are divided by its length; otherwise they are divided by the
/// length of `today`'s month. A `today` earlier than `birth` yields zero.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn precise_age(birth: NaiveDate, today: NaiveDate) -> f64 {
    if today <= birth {
        return 0.0;
    }

    let mut months =
        (today.year() - birth.year()) * 12 + today.month() as i32 - birth.month() as i32;
    let mut days = today.day() as i32 - birth.day() as i32;
    let mut month_days = month_length(today);
    if days < 0 {
        months -= 1;
        month_days = previous_month_length(today);
        days += month_days as i32;
    }
    let months = months.max(0);
    let days = days.max(0);

    f64::from(months / 12)
        + f64::from(months % 12) / 12.0
        + f64::from(days) / f64::from(month_days)
}

fn month_length(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

fn previous_month_length(date: NaiveDate) -> u32 {
    date.with_day(1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Age folded into the 80-year cycle
#[inline]
#[must_use]
pub fn cycle_age(age: f64) -> f64 {
    age.rem_euclid(CYCLE_YEARS)
}

/// Outcome of a forecast lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Forecast {
    /// A band matched
    Band {
        /// Selected point
        key: PointKey,
        /// Value of the selected point
        arcana: Arcana,
        /// Matching band
        band: ForecastBand,
    },
    /// Cycle age falls into a gap between bands
    NoMatch {
        /// Age within the cycle
        cycle_age: f64,
    },
}

impl Forecast {
    /// Selected arcana, if any band matched
    #[must_use]
    pub fn arcana(&self) -> Option<Arcana> {
        match self {
            Self::Band { arcana, .. } => Some(*arcana),
            Self::NoMatch { .. } => None,
        }
    }

    /// Selected arcana or the value of `fallback`
    #[must_use]
    pub fn arcana_or(&self, points: &PointSet, fallback: PointKey) -> Option<Arcana> {
        self.arcana().or_else(|| points.get(fallback))
    }

    /// Convert a gap into a `LookupError`
    pub fn into_result(self) -> Result<(PointKey, Arcana), LookupError> {
        match self {
            Self::Band { key, arcana, .. } => Ok((key, arcana)),
            Self::NoMatch { cycle_age } => Err(LookupError::NoForecastBand { cycle_age }),
        }
    }
}

/// Resolve the year point for `birth` as of `today`
#[must_use]
pub fn resolve_forecast(birth: NaiveDate, today: NaiveDate, points: &PointSet) -> Forecast {
    let age = precise_age(birth, today);
    let cycle_age = cycle_age(age);

    let Some(band) = band_for(cycle_age) else {
        tracing::warn!(%birth, cycle_age, "no forecast band for age");
        return Forecast::NoMatch { cycle_age };
    };
    let Some(arcana) = points.get(band.key) else {
        return Forecast::NoMatch { cycle_age };
    };

    tracing::debug!(%birth, age, key = %band.key, %arcana, "resolved year forecast");
    Forecast::Band {
        key: band.key,
        arcana,
        band: *band,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute_points;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key_at(age: f64) -> Option<String> {
        band_for(age).map(|b| b.key.to_string())
    }

    #[test]
    fn table_is_complete() {
        assert_eq!(bands().count(), BAND_COUNT);
        assert!(bands().all(|b| b.min < b.max));
        assert!(bands().all(|b| b.min >= 0.0 && b.max <= CYCLE_YEARS));
    }

    #[test]
    fn first_listed_band_wins() {
        assert_eq!(key_at(0.5).as_deref(), Some("afpoint"));
        // 0..1.5 and 1..2.5 overlap
        assert_eq!(key_at(1.2).as_deref(), Some("afpoint"));
        assert_eq!(key_at(1.5).as_deref(), Some("af2point"));
        assert_eq!(key_at(9.5).as_deref(), Some("fbpoint"));
    }

    #[test]
    fn repeated_midpoint_band() {
        assert_eq!(key_at(4.2).as_deref(), Some("af4point"));
        assert_eq!(key_at(8.0).as_deref(), Some("af4point"));
        assert_eq!(key_at(47.9).as_deref(), Some("ci4point"));
        assert_eq!(key_at(78.7).as_deref(), Some("ha6point"));
    }

    #[test]
    fn gaps_have_no_band() {
        assert_eq!(key_at(5.75), None);
        assert_eq!(key_at(10.6), None);
        assert_eq!(key_at(65.9), None);
    }

    #[test]
    fn cycle_end_returns_to_start() {
        assert_eq!(key_at(79.5).as_deref(), Some("afpoint"));
        assert!((cycle_age(85.0) - 5.0).abs() < 1e-9);
        assert_eq!(key_at(cycle_age(85.0)).as_deref(), Some("af4point"));
    }

    #[test]
    fn precise_age_counts_months_and_days() {
        let age = precise_age(date(1990, 5, 15), date(2026, 10, 18));
        // October has 31 days
        let expected = 36.0 + 5.0 / 12.0 + 3.0 / 31.0;
        assert!((age - expected).abs() < 1e-9);
    }

    #[test]
    fn precise_age_borrows_days() {
        // February 2000 has 29 days: 10 - 20 + 29 = 19
        let age = precise_age(date(2000, 1, 20), date(2000, 3, 10));
        let expected = 1.0 / 12.0 + 19.0 / 29.0;
        assert!((age - expected).abs() < 1e-9);
    }

    #[test]
    fn precise_age_before_birthday_in_year() {
        let age = precise_age(date(1990, 12, 1), date(2026, 10, 18));
        let expected = 35.0 + 10.0 / 12.0 + 17.0 / 31.0;
        assert!((age - expected).abs() < 1e-9);
        assert!(precise_age(date(2026, 10, 18), date(2026, 10, 18)).abs() < f64::EPSILON);
    }

    #[test]
    fn day_fraction_uses_month_length() {
        // 5 years 3 months and 15 of April's 30 days
        let age = precise_age(date(2021, 1, 1), date(2026, 4, 16));
        assert!((age - 5.75).abs() < 1e-9);
        assert_eq!(key_at(age), None);

        let points = compute_points(1, 1, 2021);
        let forecast = resolve_forecast(date(2021, 1, 1), date(2026, 4, 16), &points);
        assert!(matches!(forecast, Forecast::NoMatch { .. }));
    }

    #[test]
    fn december_and_leap_february_lengths() {
        assert_eq!(month_length(date(2026, 12, 5)), 31);
        assert_eq!(month_length(date(2024, 2, 10)), 29);
        assert_eq!(previous_month_length(date(2023, 3, 1)), 28);
    }

    #[test]
    fn half_year_old_selects_afpoint() {
        let birth = date(2026, 4, 18);
        let points = compute_points(18, 4, 2026);
        let forecast = resolve_forecast(birth, date(2026, 10, 18), &points);
        match forecast {
            Forecast::Band { key, arcana, .. } => {
                assert_eq!(key, PointKey::Year(Segment::Af, YearStep::Start));
                assert_eq!(arcana, points.year(Segment::Af, YearStep::Start));
            }
            Forecast::NoMatch { .. } => panic!("expected a band"),
        }
    }

    #[test]
    fn gap_age_is_soft_failure() {
        // 5 years 9 months
        let birth = date(2021, 1, 18);
        let points = compute_points(18, 1, 2021);
        let forecast = resolve_forecast(birth, date(2026, 10, 18), &points);
        assert_eq!(forecast.arcana(), None);
        assert!(matches!(forecast, Forecast::NoMatch { .. }));
        assert!(matches!(
            forecast.into_result(),
            Err(LookupError::NoForecastBand { .. })
        ));

        let fallback = PointKey::Main(crate::point_key::MainPoint::V);
        assert_eq!(forecast.arcana_or(&points, fallback), points.get(fallback));
    }
}
