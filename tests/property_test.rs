//! Property tests for Decimal arithmetic and memoized evaluation.

mod common;

use common::*;
use proptest::prelude::*;
use tacore::domain::decimal::Decimal;
use tacore::domain::factory::IndicatorFactory;
use tacore::domain::indicator::{CachedIndicator, Indicator, IndicatorKind};

fn decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000, 0u32..8).prop_map(|(num, scale)| Decimal::new(num, scale))
}

proptest! {
    #[test]
    fn nan_propagates_through_arithmetic(x in decimal()) {
        let nan = Decimal::NAN;
        prop_assert!((x + nan).is_nan());
        prop_assert!((nan - x).is_nan());
        prop_assert!((x * nan).is_nan());
        prop_assert!((nan / x).is_nan());
        prop_assert!((x / nan).is_nan());
        prop_assert!(!(x < nan) && !(x > nan) && !(x <= nan) && !(x >= nan));
    }

    #[test]
    fn division_by_zero_is_nan(x in decimal()) {
        prop_assert!((x / Decimal::ZERO).is_nan());
    }

    #[test]
    fn is_equal_is_symmetric(a in decimal(), b in decimal(), eps in decimal()) {
        let eps = eps.abs();
        prop_assert_eq!(a.is_equal(b, eps), b.is_equal(a, eps));
        prop_assert!(a.is_equal(a, eps));
    }

    #[test]
    fn text_round_trip(x in decimal()) {
        let back: Decimal = x.to_string().parse().unwrap();
        prop_assert_eq!(back, x);
    }

    #[test]
    fn repeated_requests_never_recompute(
        requests in prop::collection::vec(0usize..200, 1..50)
    ) {
        let series = generate_series(200);
        let indicator = CachedIndicator::new(CountingFormula::new(&series));
        let first: Vec<Decimal> = requests.iter().map(|&i| indicator.value(i).unwrap()).collect();
        let highest = requests.iter().copied().max().unwrap();
        prop_assert_eq!(indicator.formula().calls(), highest + 1);

        let again: Vec<Decimal> = requests.iter().map(|&i| indicator.value(i).unwrap()).collect();
        prop_assert_eq!(first, again);
        prop_assert_eq!(indicator.formula().calls(), highest + 1);
    }

    #[test]
    fn request_order_does_not_change_values(
        requests in prop::collection::vec(0usize..120, 1..30),
        period in 1usize..20
    ) {
        let series = generate_series(120);
        let params = [Decimal::from(period)];
        let fresh = IndicatorKind::Adx.build(&series, None, &params).unwrap();
        let expected = fresh.values().unwrap();

        let scattered = IndicatorKind::Adx.build(&series, None, &params).unwrap();
        for &i in &requests {
            prop_assert_eq!(scattered.value(i).unwrap(), expected[i]);
        }
    }

    #[test]
    fn directional_index_stays_in_range(len in 2usize..150, period in 1usize..30) {
        let series = generate_series(len);
        let params = [Decimal::from(period)];
        for kind in [IndicatorKind::PlusDi, IndicatorKind::MinusDi, IndicatorKind::Dx, IndicatorKind::Adx] {
            let indicator = kind.build(&series, None, &params).unwrap();
            for value in indicator.values().unwrap() {
                prop_assert!(value >= Decimal::ZERO, "{} below zero: {}", kind, value);
                prop_assert!(value <= Decimal::HUNDRED, "{} above 100: {}", kind, value);
            }
        }
    }
}
