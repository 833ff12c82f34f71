//! 다중 스텝 가격 예측 엔진.
//!
//! 한 번의 요청은 다음 순서로 진행됩니다:
//!
//! 1. 지표 계산 후 feature 테이블 생성
//! 2. 순서를 보존하는 K-폴드 교차검증 (폴드마다 학습 구간에서만 스케일러 적합)
//! 3. 전체 테이블로 재학습, 후행 홀드아웃으로 RMSE/MAE/R² 산출
//! 4. 롤아웃: 직전 종가/거래량 버퍼와 지표 스트림을 들고 한 영업일씩 예측
//!
//! 모델은 요청마다 새로 학습되며 공유되지 않습니다.

use std::collections::VecDeque;

use chrono::NaiveDate;
use ndarray::{s, Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use stockcast_core::{
    business_days_after, decimal_from_f64, ticker_span, AnalysisError, AnalysisResult, AppConfig,
    DecimalExt, EvaluationReport, FittedValue, FoldReport, ForecastConfig, ForecastPoint,
    ForecastReport, ModelKind, RolloutMetadata, Series, VolumePolicy,
};
use tracing::{debug, info, warn};

use super::features::{
    row_features, FeatureBuilder, FeatureTable, CLOSE_WINDOW, FEATURE_NAMES, VOLUME_WINDOW,
};
use super::metrics::{rmse, RegressionMetrics};
use super::model::{strategy_for, RegressionStrategy, TrainedModel};
use super::scaler::{MinMaxScaler, TargetScaler};
use super::validation::{Fold, TimeSeriesSplit};
use crate::indicators::{IndicatorEngine, IndicatorParams, IndicatorStream};

/// 허용되는 최소 예측 기간 (영업일).
pub const MIN_HORIZON: usize = 10;
/// 허용되는 최대 예측 기간 (영업일).
pub const MAX_HORIZON: usize = 60;

/// 예측 파라미터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    pub model: ModelKind,
    /// 기본 예측 기간
    pub horizon: usize,
    pub cv_folds: usize,
    /// 후행 홀드아웃 비율 (0, 1)
    pub holdout_fraction: f64,
    pub min_training_rows: usize,
    /// 신뢰 밴드 폭 (예측값 대비 비율)
    pub band_pct: f64,
    pub seed: u64,
    pub forest_trees: usize,
    pub forest_max_depth: usize,
    pub min_samples_leaf: usize,
    pub boosting_rounds: usize,
    pub learning_rate: f64,
    pub boosting_max_depth: usize,
    pub ridge_alpha: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self::from(&ForecastConfig::default())
    }
}

impl From<&ForecastConfig> for ForecastParams {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            model: config.model,
            horizon: config.horizon,
            cv_folds: config.cv_folds,
            holdout_fraction: config.holdout_fraction,
            min_training_rows: config.min_training_rows,
            band_pct: config.band_pct,
            seed: config.seed,
            forest_trees: config.forest_trees,
            forest_max_depth: config.forest_max_depth,
            min_samples_leaf: config.min_samples_leaf,
            boosting_rounds: config.boosting_rounds,
            learning_rate: config.learning_rate,
            boosting_max_depth: config.boosting_max_depth,
            ridge_alpha: config.ridge_alpha,
        }
    }
}

impl ForecastParams {
    /// 파라미터 유효성을 검사합니다.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.cv_folds < 2 {
            return Err(AnalysisError::InvalidRequest(format!(
                "cv_folds는 2 이상이어야 합니다: {}",
                self.cv_folds
            )));
        }
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(AnalysisError::InvalidRequest(format!(
                "holdout_fraction은 (0, 1) 범위여야 합니다: {}",
                self.holdout_fraction
            )));
        }
        if !(self.band_pct >= 0.0 && self.band_pct < 1.0) {
            return Err(AnalysisError::InvalidRequest(format!(
                "band_pct는 [0, 1) 범위여야 합니다: {}",
                self.band_pct
            )));
        }
        Ok(())
    }

    /// 설정된 모델 종류의 전략.
    pub fn strategy(&self) -> Box<dyn RegressionStrategy> {
        strategy_for(self.model, self)
    }
}

/// 예측 엔진.
#[derive(Debug, Default)]
pub struct ForecastEngine {
    indicators: IndicatorEngine,
    features: FeatureBuilder,
    params: ForecastParams,
}

impl ForecastEngine {
    /// 지표 파라미터와 예측 파라미터로 엔진을 생성합니다.
    pub fn new(indicator_params: IndicatorParams, params: ForecastParams) -> AnalysisResult<Self> {
        params.validate()?;
        let features = FeatureBuilder::new(&indicator_params);
        let indicators = IndicatorEngine::new(indicator_params)?;
        Ok(Self {
            indicators,
            features,
            params,
        })
    }

    /// 애플리케이션 설정에서 엔진을 생성합니다.
    pub fn from_config(config: &AppConfig) -> AnalysisResult<Self> {
        let indicator_params = IndicatorParams::try_from(&config.indicators)?;
        Self::new(indicator_params, ForecastParams::from(&config.forecast))
    }

    pub fn params(&self) -> &ForecastParams {
        &self.params
    }

    /// 시계열 하나를 학습/평가하고 `horizon` 영업일을 예측합니다.
    ///
    /// # 에러
    /// - `horizon`이 [10, 60] 밖이면 `InvalidHorizon`
    /// - 학습 가능한 행이 `min_training_rows` 미만이면 `InsufficientTrainingData`
    /// - 타깃 분산이 0이면 `DegenerateSeries`
    pub fn forecast(
        &self,
        series: &Series,
        strategy: &dyn RegressionStrategy,
        horizon: usize,
    ) -> AnalysisResult<ForecastReport> {
        let span = ticker_span!("forecast", series.ticker(), strategy.name());
        let _guard = span.enter();

        if !(MIN_HORIZON..=MAX_HORIZON).contains(&horizon) {
            warn!(horizon, "Rejected forecast horizon");
            return Err(AnalysisError::InvalidHorizon {
                requested: horizon,
                min: MIN_HORIZON,
                max: MAX_HORIZON,
            });
        }

        let table = self.training_table(series)?;
        let x = table.matrix();
        let y = table.targets();

        let volumes = series.volumes_f64();
        let recent_volume = &volumes[volumes.len() - VOLUME_WINDOW..];
        if recent_volume.iter().all(|v| *v == 0.0) {
            warn!("Rejected forecast: zero trailing volume");
            return Err(AnalysisError::DegenerateSeries(format!(
                "최근 {}일 거래량이 모두 0이라 롤아웃의 volume_ratio를 계산할 수 없습니다",
                VOLUME_WINDOW
            )));
        }

        if y.iter().all(|v| *v == y[0]) {
            warn!("Rejected constant target");
            return Err(AnalysisError::DegenerateSeries(
                "타깃 종가의 분산이 0입니다".to_string(),
            ));
        }

        let folds = self.cross_validate(&table, x.view(), y.view(), strategy)?;
        let cv_rmse = folds.iter().map(|f| f.rmse).sum::<f64>() / folds.len() as f64;

        // 전체 재학습
        let scaler = MinMaxScaler::fit(x.view());
        let target_scaler = TargetScaler::fit(y.view());
        let x_scaled = scaler.transform(x.view());
        let model = strategy.fit(x_scaled.view(), target_scaler.transform_all(y.view()).view())?;
        let in_sample = target_scaler.inverse_all(&model.predict(x_scaled.view()));

        let holdout_rows = ((y.len() as f64 * self.params.holdout_fraction).ceil() as usize)
            .clamp(1, y.len());
        let holdout_start = y.len() - holdout_rows;
        let holdout = RegressionMetrics::regression(
            y.slice(s![holdout_start..]),
            in_sample.slice(s![holdout_start..]),
        );

        let evaluation = EvaluationReport {
            rmse: holdout.rmse,
            mae: holdout.mae,
            r2: holdout.r2,
            cv_rmse,
            folds,
            holdout_rows,
            feature_importance: model.feature_importance(&FEATURE_NAMES),
        };

        let fitted = align_fitted(series, &table.dates(), in_sample.view());
        let points = self.rollout(series, model.as_ref(), &scaler, &target_scaler, horizon)?;

        let metadata = RolloutMetadata {
            model: strategy.name().to_string(),
            horizon,
            training_rows: table.len(),
            last_date: series.dates()[series.len() - 1],
            last_close: series.closes_f64()[series.len() - 1],
            volume_policy: VolumePolicy::HoldLastObserved,
            held_volume: volumes[volumes.len() - 1],
            band_pct: self.params.band_pct,
            band_is_heuristic: true,
        };

        info!(
            rows = table.len(),
            horizon,
            cv_rmse,
            holdout_rmse = evaluation.rmse,
            "Forecast completed"
        );

        Ok(ForecastReport {
            ticker: series.ticker().to_string(),
            points,
            evaluation,
            fitted,
            metadata,
        })
    }

    /// 설정된 기본 모델로 예측합니다.
    pub fn forecast_default(&self, series: &Series, horizon: usize) -> AnalysisResult<ForecastReport> {
        let strategy = self.params.strategy();
        self.forecast(series, strategy.as_ref(), horizon)
    }

    fn training_table(&self, series: &Series) -> AnalysisResult<FeatureTable> {
        let set = self.indicators.compute(series);
        let table = match self.features.build(series, &set) {
            Ok(table) => table,
            Err(AnalysisError::InsufficientHistory { .. }) => FeatureTable::default(),
            Err(err) => return Err(err),
        };

        if table.len() < self.params.min_training_rows {
            warn!(
                rows = table.len(),
                required = self.params.min_training_rows,
                "Rejected forecast: not enough training rows"
            );
            return Err(AnalysisError::InsufficientTrainingData {
                required: self.params.min_training_rows,
                provided: table.len(),
            });
        }
        Ok(table)
    }

    fn cross_validate(
        &self,
        table: &FeatureTable,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        strategy: &dyn RegressionStrategy,
    ) -> AnalysisResult<Vec<FoldReport>> {
        let dates = table.dates();
        let splits = TimeSeriesSplit::new(self.params.cv_folds)?.split(y.len())?;
        let mut reports = Vec::with_capacity(splits.len());

        for (i, fold) in splits.into_iter().enumerate() {
            let predicted = fold_predictions(x, y, &fold, strategy)?;
            let fold_rmse = rmse(y.slice(s![fold.validation.clone()]), predicted.view());

            debug!(
                fold = i + 1,
                train_rows = fold.train.len(),
                validation_rows = fold.validation.len(),
                rmse = fold_rmse,
                "CV fold evaluated"
            );

            reports.push(FoldReport {
                fold: i + 1,
                train_start: dates[fold.train.start],
                train_end: dates[fold.train.end - 1],
                validation_start: dates[fold.validation.start],
                validation_end: dates[fold.validation.end - 1],
                train_rows: fold.train.len(),
                validation_rows: fold.validation.len(),
                rmse: fold_rmse,
            });
        }

        Ok(reports)
    }

    /// 예측 종가를 버퍼와 지표 스트림에 덧붙이며 한 영업일씩 예측합니다.
    fn rollout(
        &self,
        series: &Series,
        model: &dyn TrainedModel,
        scaler: &MinMaxScaler,
        target_scaler: &TargetScaler,
        horizon: usize,
    ) -> AnalysisResult<Vec<ForecastPoint>> {
        let closes = series.closes_f64();
        let volumes = series.volumes_f64();
        let last_close = closes[closes.len() - 1];
        let held_volume = volumes[volumes.len() - 1];
        let last_date = series.dates()[series.len() - 1];

        let mut close_buf: VecDeque<f64> =
            closes[closes.len() - CLOSE_WINDOW..].iter().copied().collect();
        let mut volume_buf: VecDeque<f64> =
            volumes[volumes.len() - VOLUME_WINDOW..].iter().copied().collect();
        let mut stream = IndicatorStream::seeded(self.indicators.params(), &series.closes());
        let mut point = stream.current();

        let band = self.params.band_pct;
        let mut forecasts = Vec::with_capacity(horizon);

        for date in business_days_after(last_date, horizon) {
            let row = row_features(
                close_buf.make_contiguous(),
                volume_buf.make_contiguous(),
                &point,
                date,
            )
            .map(Array1::from)
            .ok_or_else(|| undefined_rollout_row(date))?;

            let scaled = scaler.transform_row(row.view());
            let predicted = target_scaler.inverse(model.predict_one(scaled.view()));

            forecasts.push(ForecastPoint {
                date,
                predicted_close: predicted,
                lower_bound: predicted * (1.0 - band),
                upper_bound: predicted * (1.0 + band),
                pct_change: (predicted / last_close - 1.0) * 100.0,
            });

            close_buf.pop_front();
            close_buf.push_back(predicted);
            volume_buf.pop_front();
            volume_buf.push_back(held_volume);

            let close = decimal_from_f64(predicted).ok_or_else(|| undefined_rollout_row(date))?;
            point = stream.push(close);
        }

        Ok(forecasts)
    }
}

/// 한 폴드의 검증 구간 예측값 (원래 가격 스케일).
///
/// 스케일러는 학습 구간에서만 적합합니다.
fn fold_predictions(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    fold: &Fold,
    strategy: &dyn RegressionStrategy,
) -> AnalysisResult<Array1<f64>> {
    let x_train = x.slice(s![fold.train.clone(), ..]);
    let y_train = y.slice(s![fold.train.clone()]);
    let x_valid = x.slice(s![fold.validation.clone(), ..]);

    let scaler = MinMaxScaler::fit(x_train);
    let target_scaler = TargetScaler::fit(y_train);
    let model = strategy.fit(
        scaler.transform(x_train).view(),
        target_scaler.transform_all(y_train).view(),
    )?;
    Ok(target_scaler.inverse_all(&model.predict(scaler.transform(x_valid).view())))
}

fn undefined_rollout_row(date: NaiveDate) -> AnalysisError {
    AnalysisError::DegenerateSeries(format!("{} 예측 행의 입력이 정의되지 않습니다", date))
}

/// 테이블 행의 적합값을 시계열 날짜에 맞춥니다. 행이 없는 날짜는 `None`.
fn align_fitted(series: &Series, row_dates: &[NaiveDate], fitted: ArrayView1<f64>) -> Vec<FittedValue> {
    let mut rows = row_dates.iter().zip(fitted.iter()).peekable();
    series
        .points()
        .iter()
        .map(|p| {
            let value = match rows.peek() {
                Some((date, value)) if **date == p.date => {
                    let v = **value;
                    rows.next();
                    Some(v)
                }
                _ => None,
            };
            FittedValue {
                date: p.date,
                actual: p.close.to_f64_lossy(),
                fitted: value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::linear::RidgeStrategy;
    use ndarray::Array2;
    use rust_decimal::Decimal;
    use stockcast_core::{ErrorKind, PricePoint};

    fn wave_series(n: usize) -> Series {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let points = business_days_after(start, n)
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                let x = i as f64;
                let close = 100.0 + 0.2 * x + 5.0 * (x / 6.0).sin();
                PricePoint::from_close(
                    d,
                    decimal_from_f64(close).unwrap().round_dp(4),
                    Decimal::from(10_000 + (i % 7) * 500),
                )
            })
            .collect();
        Series::new("WAVE", points).unwrap()
    }

    fn fast_params() -> ForecastParams {
        ForecastParams {
            forest_trees: 10,
            boosting_rounds: 30,
            ..ForecastParams::default()
        }
    }

    fn engine() -> ForecastEngine {
        ForecastEngine::new(IndicatorParams::default(), fast_params()).unwrap()
    }

    #[test]
    fn test_forecast_shape() {
        let series = wave_series(160);
        let engine = engine();
        let strategy = strategy_for(ModelKind::RandomForest, engine.params());

        let report = engine.forecast(&series, strategy.as_ref(), 15).unwrap();

        assert_eq!(report.points.len(), 15);
        assert_eq!(report.evaluation.folds.len(), 5);
        assert_eq!(report.fitted.len(), series.len());
        assert!(report.fitted[..34].iter().all(|f| f.fitted.is_none()));
        assert!(report.fitted[34..].iter().all(|f| f.fitted.is_some()));
        assert_eq!(report.metadata.training_rows, 160 - 34);
        assert!(report.metadata.band_is_heuristic);

        let last_date = series.dates()[series.len() - 1];
        assert!(report.points[0].date > last_date);
        for p in &report.points {
            assert!(p.lower_bound < p.predicted_close && p.predicted_close < p.upper_bound);
            assert!((p.upper_bound - p.predicted_close * 1.05).abs() < 1e-9);
        }
    }

    #[test]
    fn test_folds_are_time_ordered() {
        let series = wave_series(160);
        let engine = engine();
        let strategy = strategy_for(ModelKind::Linear, engine.params());

        let report = engine.forecast(&series, strategy.as_ref(), 10).unwrap();
        for fold in &report.evaluation.folds {
            assert!(fold.train_end < fold.validation_start);
            assert!(fold.rmse.is_finite());
        }
    }

    #[test]
    fn test_invalid_horizon() {
        let series = wave_series(160);
        let engine = engine();
        let strategy = strategy_for(ModelKind::Linear, engine.params());

        for horizon in [0, 9, 61] {
            let err = engine.forecast(&series, strategy.as_ref(), horizon).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidHorizon);
        }
    }

    #[test]
    fn test_short_series_is_insufficient_training_data() {
        let engine = engine();
        let strategy = strategy_for(ModelKind::Linear, engine.params());

        for n in [10, 60, 93] {
            let err = engine
                .forecast(&wave_series(n), strategy.as_ref(), 10)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InsufficientTrainingData);
        }
    }

    #[test]
    fn test_fold_scalers_see_only_training_rows() {
        let x = Array2::from_shape_fn((60, 3), |(i, j)| {
            let t = i as f64;
            match j {
                0 => t,
                1 => (t * 0.7).sin() * 10.0,
                _ => (i % 5) as f64,
            }
        });
        let y = x.column(0).mapv(|t| 50.0 + 2.0 * t) + &x.column(1);
        let fold = Fold {
            train: 0..40,
            validation: 40..60,
        };
        let strategy = RidgeStrategy { alpha: 1.0 };

        let base = fold_predictions(x.view(), y.view(), &fold, &strategy).unwrap();

        // 검증 구간의 마지막 행 feature와 모든 검증 타깃을 크게 바꿈
        let mut x_shifted = x.clone();
        x_shifted.row_mut(59).mapv_inplace(|v| v * 100.0 + 1_000.0);
        let mut y_shifted = y.clone();
        y_shifted.slice_mut(s![40..]).mapv_inplace(|v| v * 3.0);

        let shifted = fold_predictions(x_shifted.view(), y_shifted.view(), &fold, &strategy).unwrap();

        assert_eq!(base.len(), 20);
        assert_eq!(base.slice(s![..19]), shifted.slice(s![..19]));
        assert_ne!(base[19], shifted[19]);
    }

    #[test]
    fn test_zero_trailing_volume_is_degenerate() {
        let base = wave_series(160);
        let n = base.len();
        let points = base
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let volume = if i >= n - 20 { Decimal::ZERO } else { p.volume };
                PricePoint::from_close(p.date, p.close, volume)
            })
            .collect();
        let series = Series::new("NOVOL", points).unwrap();
        let engine = engine();
        let strategy = strategy_for(ModelKind::Linear, engine.params());

        let err = engine.forecast(&series, strategy.as_ref(), 10).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DegenerateSeries);
        assert!(err.to_string().contains("거래량"));
    }

    #[test]
    fn test_params_validation() {
        let params = ForecastParams {
            holdout_fraction: 1.5,
            ..ForecastParams::default()
        };
        assert!(ForecastEngine::new(IndicatorParams::default(), params).is_err());
    }
}
