//! Compatibility matrix
//!
//! The couple's primaries are the reduced sums of both partners' primaries;
//! everything else is derived by the ordinary calculator, plus the union
//! point `f + g`.

use crate::calculator::{PointCalculator, PointSet, Primaries};
use crate::input::BirthInput;
use crate::point_key::MainPoint;

impl PointCalculator {
    /// Combined primaries of two partners
    #[must_use]
    pub fn couple_primaries(&self, first: &BirthInput, second: &BirthInput) -> Primaries {
        let p1 = self.primaries(first.day(), first.month(), first.year());
        let p2 = self.primaries(second.day(), second.month(), second.year());
        let rules = self.rules();
        Primaries {
            a: rules.reduce_sum(&[p1.a, p2.a]),
            b: rules.reduce_sum(&[p1.b, p2.b]),
            c: rules.reduce_sum(&[p1.c, p2.c]),
        }
    }

    /// Full compatibility point set, including `union`
    #[must_use]
    pub fn compute_compatibility(&self, first: &BirthInput, second: &BirthInput) -> PointSet {
        let points = self.compute_from_primaries(self.couple_primaries(first, second));
        let union = self
            .rules()
            .reduce_sum(&[points.main(MainPoint::F), points.main(MainPoint::G)]);
        tracing::debug!(
            first = %first.date(),
            second = %second.date(),
            %union,
            "computed compatibility matrix"
        );
        points.with_union(union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point_key::PointKey;
    use chrono::NaiveDate;

    fn input(date: &str) -> BirthInput {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        BirthInput::parse(date, None, today).unwrap()
    }

    #[test]
    fn couple_primaries_are_reduced_sums() {
        let calc = PointCalculator::default();
        // (15, 5, 19) + (3, 11, 5)
        let p = calc.couple_primaries(&input("1990-05-15"), &input("1985-11-03"));
        assert_eq!(p.a.value(), 18);
        assert_eq!(p.b.value(), 16);
        // 19 + 5 = 24 -> 6
        assert_eq!(p.c.value(), 6);
    }

    #[test]
    fn union_is_reduced_f_plus_g() {
        let calc = PointCalculator::default();
        let points = calc.compute_compatibility(&input("1990-05-15"), &input("1985-11-03"));
        assert!(points.is_compatibility());
        let expected = calc
            .rules()
            .reduce_sum(&[points.main(MainPoint::F), points.main(MainPoint::G)]);
        assert_eq!(points.union(), Some(expected));
        assert_eq!(points.len(), PointKey::compatibility().count());
    }

    #[test]
    fn partner_order_does_not_matter() {
        let calc = PointCalculator::default();
        let a = input("1990-05-15");
        let b = input("1985-11-03");
        assert_eq!(calc.compute_compatibility(&a, &b), calc.compute_compatibility(&b, &a));
    }
}
