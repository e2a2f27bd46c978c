use chrono::NaiveDate;
use matrix_points::forecast::bands;
use matrix_points::prelude::*;
use matrix_points::{band_for, cycle_age, precise_age, ReductionOverride, Segment, YearStep};
use proptest::prelude::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

#[test]
fn test_known_matrix_end_to_end() {
    let input = BirthInput::parse("1990-05-15", Some("Anna"), today()).unwrap();
    let points = PointCalculator::default().compute(&input);

    assert_eq!(points.main(MainPoint::A).value(), 15);
    assert_eq!(points.main(MainPoint::C).value(), 19);
    assert_eq!(points.purpose(Purpose::Personal).value(), 6);

    // 36 years 5 months: gc band 34..35.5 has passed, 36..37.5 is gc5
    let forecast = resolve_forecast(input.date(), today(), &points);
    let (key, arcana) = forecast.into_result().unwrap();
    assert_eq!(key, PointKey::Year(Segment::Gc, YearStep::Five));
    assert_eq!(arcana, points.year(Segment::Gc, YearStep::Five));
}

#[test]
fn test_half_year_selects_first_band() {
    let birth = NaiveDate::from_ymd_opt(2026, 4, 18).unwrap();
    let age = precise_age(birth, today());
    assert!((age - 0.5).abs() < 1e-9);

    let band = band_for(age).unwrap();
    assert_eq!(band.key.to_string(), "afpoint");
    assert!(band.min.abs() < f64::EPSILON);
    assert!((band.max - 1.5).abs() < f64::EPSILON);
}

#[test]
fn test_override_table_changes_results() {
    let plain = PointCalculator::default().compute_points(15, 5, 1990);
    // force every 21 to 3
    let rules = ReductionRules::with_overrides(vec![ReductionOverride::new(
        21,
        21,
        Arcana::new(3).unwrap(),
    )
    .unwrap()])
    .unwrap();
    let overridden = PointCalculator::new(rules).compute_points(15, 5, 1990);

    assert_eq!(plain.main(MainPoint::S).value(), 21);
    assert_eq!(overridden.main(MainPoint::S).value(), 3);
    assert_eq!(plain.main(MainPoint::A), overridden.main(MainPoint::A));
}

fn valid_date() -> impl Strategy<Value = NaiveDate> {
    (1906i32..=2026, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
        .prop_filter("not in the future", |d| *d <= today())
}

proptest! {
    #[test]
    fn prop_every_point_in_arcana_range(date in valid_date()) {
        let input = BirthInput::from_date(date, None, today()).unwrap();
        let points = PointCalculator::default().compute(&input);

        prop_assert_eq!(points.len(), PointKey::personal().count());
        for (_, value) in points.iter() {
            prop_assert!((1..=22).contains(&value.value()));
        }
    }

    #[test]
    fn prop_reduce_always_in_range(value in 0u32..100_000) {
        let arcana = ReductionRules::new().reduce(value);
        prop_assert!((1..=22).contains(&arcana.value()));
    }

    #[test]
    fn prop_reduce_idempotent(value in 0u32..10_000, arcana in 1u32..=22) {
        let rules = ReductionRules::new();
        let once = rules.reduce(value);
        prop_assert_eq!(rules.reduce(once.value()), once);
        prop_assert_eq!(rules.reduce(arcana).value(), arcana);
    }

    #[test]
    fn prop_calculation_is_deterministic(date in valid_date()) {
        let calc = PointCalculator::default();
        let input = BirthInput::from_date(date, None, today()).unwrap();
        prop_assert_eq!(calc.compute(&input), calc.compute(&input));
    }

    #[test]
    fn prop_forecast_matches_first_listed_band(age in 0.0f64..80.0) {
        let expected = bands().find(|b| age >= b.min && age < b.max);
        prop_assert_eq!(band_for(age), expected);
    }

    #[test]
    fn prop_forecast_never_panics(birth in valid_date()) {
        let points = PointCalculator::default().compute_points(1, 1, 2000);
        let forecast = resolve_forecast(birth, today(), &points);
        let age = cycle_age(precise_age(birth, today()));
        prop_assert!((0.0..80.0).contains(&age));
        match forecast {
            Forecast::Band { band, .. } => prop_assert!(band.contains(age)),
            Forecast::NoMatch { cycle_age } => prop_assert!(band_for(cycle_age).is_none()),
        }
    }
}
