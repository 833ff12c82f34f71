//! 영업일 달력.
//!
//! 예측 날짜는 주말을 건너뛴 영업일 간격으로 생성합니다.
//! 공휴일은 고려하지 않습니다.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// 주말(토/일) 여부.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 주어진 날짜 이후의 첫 영업일.
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while is_weekend(next) {
        next += Duration::days(1);
    }
    next
}

/// `after` 이후의 영업일 `count`개를 순서대로 반환합니다.
pub fn business_days_after(after: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = after;
    for _ in 0..count {
        current = next_business_day(current);
        dates.push(current);
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_next_business_day_skips_weekend() {
        // 2024-01-05 금요일 → 2024-01-08 월요일
        assert_eq!(next_business_day(date(2024, 1, 5)), date(2024, 1, 8));
        // 토요일 → 월요일
        assert_eq!(next_business_day(date(2024, 1, 6)), date(2024, 1, 8));
        assert_eq!(next_business_day(date(2024, 1, 8)), date(2024, 1, 9));
    }

    #[test]
    fn test_business_days_after() {
        let days = business_days_after(date(2024, 1, 4), 5);
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], date(2024, 1, 5));
        assert_eq!(days[1], date(2024, 1, 8));
        assert!(days.iter().all(|d| !is_weekend(*d)));
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }
}
