//! 시계열 검증 통합 테스트
//!
//! `Series` 생성 시 날짜 순서와 가격 불변식이 지켜지는지 확인합니다.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockcast_core::{business_days_after, ErrorKind, PricePoint, Series};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn points_from(closes: &[Decimal]) -> Vec<PricePoint> {
    business_days_after(start(), closes.len())
        .into_iter()
        .zip(closes.iter())
        .map(|(date, close)| PricePoint::from_close(date, *close, dec!(1000)))
        .collect()
}

#[test]
fn test_accessors_follow_point_order() {
    let series = Series::new("MSFT", points_from(&[dec!(10), dec!(11), dec!(12.5)])).unwrap();

    assert_eq!(series.closes(), vec![dec!(10), dec!(11), dec!(12.5)]);
    assert_eq!(series.closes_f64(), vec![10.0, 11.0, 12.5]);
    assert_eq!(series.volumes_f64(), vec![1000.0; 3]);
    assert_eq!(series.first().unwrap().close, dec!(10));
    assert_eq!(series.last().unwrap().close, dec!(12.5));
    assert!(series.dates().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_decreasing_dates_rejected() {
    let mut points = points_from(&[dec!(10), dec!(11)]);
    points[1].date = points[0].date - Duration::days(1);

    let err = Series::new("MSFT", points).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DegenerateSeries);
    assert!(err.is_data_related());
}

#[test]
fn test_negative_close_rejected() {
    let err = Series::new("MSFT", points_from(&[dec!(10), dec!(-1)])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DegenerateSeries);
}

proptest! {
    #[test]
    fn prop_positive_business_day_series_is_valid(
        raw in proptest::collection::vec(1u32..100_000, 0..200)
    ) {
        let closes: Vec<Decimal> = raw.iter().map(|c| Decimal::new(*c as i64, 2)).collect();
        let series = Series::new("PROP", points_from(&closes)).unwrap();
        prop_assert_eq!(series.len(), closes.len());
        for (i, date) in series.dates().into_iter().enumerate() {
            prop_assert_eq!(series.position_of(date), Some(i));
        }
    }
}
