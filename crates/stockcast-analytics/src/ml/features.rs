//! 예측 모델을 위한 feature engineering.
//!
//! 종가 시계열에서 지도학습 테이블을 만듭니다. 타깃 날짜 t의 행은
//! t-1까지의 데이터만 봅니다 (예외: 미리 알 수 있는 타깃 날짜의 요일/월).
//!
//! 하나라도 정의되지 않은 입력이 있는 행은 대체하지 않고 버립니다.

use chrono::{Datelike, NaiveDate};
use ndarray::{Array1, Array2};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use stockcast_core::{AnalysisError, AnalysisResult, Series};
use tracing::debug;

use crate::indicators::{IndicatorParams, IndicatorPoint, IndicatorSet};

/// feature 개수.
pub const FEATURE_COUNT: usize = 22;

/// feature 이름 (열 순서).
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "lag_1",
    "lag_2",
    "lag_3",
    "lag_5",
    "lag_10",
    "roll_mean_5",
    "roll_std_5",
    "roll_mean_10",
    "roll_std_10",
    "roll_mean_20",
    "roll_std_20",
    "momentum_5",
    "momentum_10",
    "momentum_20",
    "volume_ma5",
    "volume_ratio",
    "rsi_14",
    "macd",
    "macd_hist",
    "bb_position",
    "day_of_week",
    "month",
];

/// 한 행을 만드는 데 필요한 직전 종가 수 (t-21 ~ t-1).
pub const CLOSE_WINDOW: usize = 21;
/// 한 행을 만드는 데 필요한 직전 거래량 수 (t-20 ~ t-1).
pub const VOLUME_WINDOW: usize = 20;

const LAGS: [usize; 5] = [1, 2, 3, 5, 10];
const ROLLING_WINDOWS: [usize; 3] = [5, 10, 20];
const MOMENTUM_PERIODS: [usize; 3] = [5, 10, 20];

/// 지도학습 테이블의 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// 타깃 날짜
    pub date: NaiveDate,
    /// `FEATURE_NAMES` 순서의 feature 값
    pub features: Vec<f64>,
    /// 타깃 날짜의 종가
    pub target: f64,
}

/// 시간순으로 정렬된 지도학습 테이블.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// feature 행렬 (행 수 × `FEATURE_COUNT`).
    pub fn matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), FEATURE_COUNT), |(i, j)| {
            self.rows[i].features[j]
        })
    }

    /// 타깃 벡터.
    pub fn targets(&self) -> Array1<f64> {
        self.rows.iter().map(|r| r.target).collect()
    }

    /// 타깃 날짜 목록.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }
}

/// 시계열에서 feature 테이블을 만드는 빌더.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    first_target_index: usize,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new(&IndicatorParams::default())
    }
}

impl FeatureBuilder {
    /// 지표 워밍업 구간으로부터 첫 타깃 인덱스를 정합니다.
    pub fn new(params: &IndicatorParams) -> Self {
        // 각 지표가 처음 정의되는 인덱스 + 1 (한 기간 시프트)
        let rsi_ready = params.rsi.period + 1;
        let macd_ready = params.macd.slow_period + params.macd.signal_period - 1;
        let bollinger_ready = params.bollinger.period;

        Self {
            first_target_index: CLOSE_WINDOW
                .max(rsi_ready)
                .max(macd_ready)
                .max(bollinger_ready),
        }
    }

    /// 한 행이라도 만들기 위해 필요한 최소 데이터 수.
    pub fn min_history(&self) -> usize {
        self.first_target_index + 1
    }

    /// 시계열과 그 지표 집합으로 feature 테이블을 만듭니다.
    ///
    /// # 에러
    /// - 지표 집합 길이가 시계열과 다르면 `InvalidRequest`
    /// - 만들어진 행이 없으면 `InsufficientHistory`
    pub fn build(&self, series: &Series, indicators: &IndicatorSet) -> AnalysisResult<FeatureTable> {
        let n = series.len();
        if indicators.len() != n {
            return Err(AnalysisError::InvalidRequest(format!(
                "지표 길이({})가 시계열 길이({})와 다릅니다",
                indicators.len(),
                n
            )));
        }

        let closes = series.closes_f64();
        let volumes = series.volumes_f64();
        let dates = series.dates();

        let rows: Vec<FeatureRow> = (self.first_target_index..n)
            .filter_map(|t| {
                let features = row_features(
                    &closes[t - CLOSE_WINDOW..t],
                    &volumes[t - VOLUME_WINDOW..t],
                    &indicators.point(t - 1),
                    dates[t],
                )?;
                Some(FeatureRow {
                    date: dates[t],
                    features,
                    target: closes[t],
                })
            })
            .collect();

        if rows.is_empty() {
            return Err(AnalysisError::InsufficientHistory {
                required: self.min_history(),
                provided: n,
            });
        }

        debug!(
            ticker = series.ticker(),
            rows = rows.len(),
            dropped = n - rows.len(),
            "Feature table built"
        );

        Ok(FeatureTable { rows })
    }
}

/// 타깃 날짜 하나의 feature 벡터.
///
/// # 인자
/// * `closes` - t-21 ~ t-1의 종가 (`CLOSE_WINDOW`개)
/// * `volumes` - t-20 ~ t-1의 거래량 (`VOLUME_WINDOW`개)
/// * `point` - t-1 시점의 지표
/// * `target_date` - 타깃 날짜 t
///
/// 정의되지 않은 입력이 있으면 `None`.
pub fn row_features(
    closes: &[f64],
    volumes: &[f64],
    point: &IndicatorPoint,
    target_date: NaiveDate,
) -> Option<Vec<f64>> {
    if closes.len() != CLOSE_WINDOW || volumes.len() != VOLUME_WINDOW {
        return None;
    }

    let last = closes[CLOSE_WINDOW - 1];
    let mut features = Vec::with_capacity(FEATURE_COUNT);

    for lag in LAGS {
        features.push(closes[CLOSE_WINDOW - lag]);
    }

    for window in ROLLING_WINDOWS {
        let slice = &closes[CLOSE_WINDOW - window..];
        let (mean, std) = mean_std(slice);
        features.push(mean);
        features.push(std);
    }

    for k in MOMENTUM_PERIODS {
        features.push(last - closes[CLOSE_WINDOW - 1 - k]);
    }

    let (volume_ma5, _) = mean_std(&volumes[VOLUME_WINDOW - 5..]);
    let (volume_ma20, _) = mean_std(volumes);
    if volume_ma20 == 0.0 {
        return None;
    }
    features.push(volume_ma5);
    features.push(volumes[VOLUME_WINDOW - 1] / volume_ma20);

    features.push(point.rsi?.to_f64()?);
    features.push(point.macd.macd?.to_f64()?);
    features.push(point.macd.histogram?.to_f64()?);
    features.push(point.bollinger.percent_b?.to_f64()?.clamp(0.0, 1.0));

    features.push(target_date.weekday().num_days_from_monday() as f64);
    features.push(target_date.month() as f64);

    Some(features)
}

/// 평균과 모표준편차.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorEngine;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use stockcast_core::{business_days_after, PricePoint};

    fn series(n: usize) -> Series {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let points = business_days_after(start, n)
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                let close = Decimal::from(100 + (i * 7) % 11) + Decimal::new(i as i64, 1);
                PricePoint::from_close(d, close, Decimal::from(1000 + (i % 5) * 100))
            })
            .collect();
        Series::new("FEAT", points).unwrap()
    }

    #[test]
    fn test_feature_names_match_count() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_first_row_after_warmup() {
        let s = series(60);
        let set = IndicatorEngine::default().compute(&s);
        let builder = FeatureBuilder::default();

        let table = builder.build(&s, &set).unwrap();

        assert_eq!(builder.min_history(), 35);
        assert_eq!(table.len(), 60 - 34);
        assert_eq!(table.rows[0].date, s.dates()[34]);
        assert!(table.rows.iter().all(|r| r.features.len() == FEATURE_COUNT));
        assert_eq!(table.matrix().dim(), (26, FEATURE_COUNT));
        assert_eq!(table.targets()[0], s.closes_f64()[34]);
    }

    #[test]
    fn test_row_uses_previous_close() {
        let s = series(60);
        let set = IndicatorEngine::default().compute(&s);
        let table = FeatureBuilder::default().build(&s, &set).unwrap();
        let closes = s.closes_f64();

        let row = &table.rows[0];
        assert_eq!(row.target, closes[34]);
        assert_eq!(row.features[0], closes[33]); // lag_1
        assert_eq!(row.features[4], closes[24]); // lag_10
        assert_eq!(row.features[13], closes[33] - closes[13]); // momentum_20
    }

    #[test]
    fn test_bb_position_clipped() {
        let s = series(60);
        let set = IndicatorEngine::default().compute(&s);
        let table = FeatureBuilder::default().build(&s, &set).unwrap();

        for row in &table.rows {
            let bb = row.features[19];
            assert!((0.0..=1.0).contains(&bb));
            assert!((0.0..=4.0).contains(&row.features[20]));
        }
    }

    #[test]
    fn test_short_series_is_insufficient_history() {
        let s = series(30);
        let set = IndicatorEngine::default().compute(&s);
        let err = FeatureBuilder::default().build(&s, &set).unwrap_err();
        assert_eq!(err.kind(), stockcast_core::ErrorKind::InsufficientHistory);
    }

    #[test]
    fn test_zero_volume_rows_dropped() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let points = business_days_after(start, 60)
            .into_iter()
            .enumerate()
            .map(|(i, d)| PricePoint::from_close(d, Decimal::from(100 + i % 3), dec!(0)))
            .collect();
        let s = Series::new("NOVOL", points).unwrap();
        let set = IndicatorEngine::default().compute(&s);

        let err = FeatureBuilder::default().build(&s, &set).unwrap_err();
        assert_eq!(err.kind(), stockcast_core::ErrorKind::InsufficientHistory);
    }
}
