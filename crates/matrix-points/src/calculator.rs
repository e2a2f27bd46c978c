//! Point calculator
//!
//! Turns the three primary numbers of a birth date into the full matrix:
//! - octagram points `a..=x`
//! - purpose points
//! - year forecast points for each ten-year segment
//!
//! Calculation is a pure function of its inputs; the resulting `PointSet`
//! is never mutated afterwards.

use crate::arcana::{digit_sum, Arcana, ReductionRules};
use crate::input::BirthInput;
use crate::point_key::{MainPoint, PointKey, Purpose, Segment, YearStep};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Primary numbers taken directly from the birth date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Primaries {
    /// Reduced day of birth
    pub a: Arcana,
    /// Month of birth
    pub b: Arcana,
    /// Reduced digit sum of the year
    pub c: Arcana,
}

/// Immutable set of calculated points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointSet {
    main: [Arcana; MainPoint::COUNT],
    purposes: [Arcana; Purpose::COUNT],
    years: [[Arcana; YearStep::COUNT]; Segment::COUNT],
    union: Option<Arcana>,
}

impl PointSet {
    /// Octagram point
    #[inline]
    #[must_use]
    pub fn main(&self, point: MainPoint) -> Arcana {
        self.main[point.index()]
    }

    /// Purpose point
    #[inline]
    #[must_use]
    pub fn purpose(&self, purpose: Purpose) -> Arcana {
        self.purposes[purpose.index()]
    }

    /// Year forecast point
    #[inline]
    #[must_use]
    pub fn year(&self, segment: Segment, step: YearStep) -> Arcana {
        self.years[segment.index()][step.index()]
    }

    /// Union point (compatibility matrices only)
    #[inline]
    #[must_use]
    pub fn union(&self) -> Option<Arcana> {
        self.union
    }

    /// Look up any point; `None` only for `Union` on a personal matrix
    #[must_use]
    pub fn get(&self, key: PointKey) -> Option<Arcana> {
        match key {
            PointKey::Main(p) => Some(self.main(p)),
            PointKey::Purpose(p) => Some(self.purpose(p)),
            PointKey::Year(segment, step) => Some(self.year(segment, step)),
            PointKey::Union => self.union,
        }
    }

    /// Whether this is a compatibility matrix
    #[inline]
    #[must_use]
    pub fn is_compatibility(&self) -> bool {
        self.union.is_some()
    }

    /// All present points in key order
    pub fn iter(&self) -> impl Iterator<Item = (PointKey, Arcana)> + '_ {
        PointKey::compatibility().filter_map(|key| self.get(key).map(|v| (key, v)))
    }

    /// Number of present points
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Never empty; provided for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub(crate) fn with_union(mut self, union: Arcana) -> Self {
        self.union = Some(union);
        self
    }
}

impl Serialize for PointSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(&key, &value)?;
        }
        map.end()
    }
}

/// Point calculator bound to a reduction table
#[derive(Debug, Clone, Default)]
pub struct PointCalculator {
    rules: ReductionRules,
}

impl PointCalculator {
    /// Create calculator with a reduction table
    #[inline]
    #[must_use]
    pub fn new(rules: ReductionRules) -> Self {
        Self { rules }
    }

    /// Reduction table in use
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &ReductionRules {
        &self.rules
    }

    /// Primary numbers of a birth date
    ///
    /// Inputs are assumed valid; use `BirthInput` to validate raw values.
    #[must_use]
    pub fn primaries(&self, day: u32, month: u32, year: i32) -> Primaries {
        Primaries {
            a: self.rules.reduce(day),
            b: self.rules.reduce(month),
            c: self.rules.reduce(digit_sum(year.unsigned_abs())),
        }
    }

    /// Full point set for raw date components
    #[must_use]
    pub fn compute_points(&self, day: u32, month: u32, year: i32) -> PointSet {
        self.compute_from_primaries(self.primaries(day, month, year))
    }

    /// Full point set for a validated input
    #[must_use]
    pub fn compute(&self, input: &BirthInput) -> PointSet {
        let points = self.compute_points(input.day(), input.month(), input.year());
        tracing::debug!(
            date = %input.date(),
            a = %points.main(MainPoint::A),
            b = %points.main(MainPoint::B),
            c = %points.main(MainPoint::C),
            "computed personal matrix"
        );
        points
    }

    /// Derive every point from the three primaries
    #[must_use]
    pub fn compute_from_primaries(&self, primaries: Primaries) -> PointSet {
        let main = self.main_points(primaries);
        let purposes = self.purposes(&main);
        let years = Segment::ALL.map(|segment| {
            self.segment_points(main[segment.start().index()], main[segment.end().index()])
        });

        PointSet {
            main,
            purposes,
            years,
            union: None,
        }
    }

    fn main_points(&self, Primaries { a, b, c }: Primaries) -> [Arcana; MainPoint::COUNT] {
        let r = |parts: &[Arcana]| self.rules.reduce_sum(parts);

        let d = r(&[a, b, c]);
        let e = r(&[a, b, c, d]);
        let f = r(&[a, b]);
        let g = r(&[b, c]);
        let h = r(&[d, a]);
        let i = r(&[c, d]);
        let j = r(&[d, e]);
        let n = r(&[c, e]);
        let l = r(&[j, n]);
        let m = r(&[l, n]);
        let k = r(&[j, l]);
        let q = r(&[n, c]);
        let rr = r(&[j, d]);
        let s = r(&[a, e]);
        let t = r(&[b, e]);
        let o = r(&[a, s]);
        let p = r(&[b, t]);
        let u = r(&[f, g, h, i]);
        let v = r(&[e, u]);
        let w = r(&[s, e]);
        let x = r(&[t, e]);

        [
            a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p, q, rr, s, t, u, v, w, x,
        ]
    }

    fn purposes(&self, main: &[Arcana; MainPoint::COUNT]) -> [Arcana; Purpose::COUNT] {
        let r = |parts: &[Arcana]| self.rules.reduce_sum(parts);
        let at = |p: MainPoint| main[p.index()];

        let sky = r(&[at(MainPoint::B), at(MainPoint::D)]);
        let earth = r(&[at(MainPoint::A), at(MainPoint::C)]);
        let personal = r(&[sky, earth]);
        let male = r(&[at(MainPoint::F), at(MainPoint::I)]);
        let female = r(&[at(MainPoint::G), at(MainPoint::H)]);
        let social = r(&[male, female]);
        let general = r(&[personal, social]);
        let planetary = r(&[social, general]);

        [sky, earth, personal, male, female, social, general, planetary]
    }

    /// Points along one ten-year segment, in `YearStep` order
    fn segment_points(&self, start: Arcana, end: Arcana) -> [Arcana; YearStep::COUNT] {
        let r = |parts: &[Arcana]| self.rules.reduce_sum(parts);

        let mid = r(&[start, end]);
        let quarter = r(&[start, mid]);
        let eighth = r(&[start, quarter]);
        let three_eighths = r(&[quarter, mid]);
        let three_quarters = r(&[mid, end]);
        let five_eighths = r(&[mid, three_quarters]);
        let seven_eighths = r(&[three_quarters, end]);

        [
            start,
            quarter,
            eighth,
            three_eighths,
            mid,
            five_eighths,
            seven_eighths,
        ]
    }
}

/// Point set with plain digit-sum reduction
#[must_use]
pub fn compute_points(day: u32, month: u32, year: i32) -> PointSet {
    PointCalculator::default().compute_points(day, month, year)
}
