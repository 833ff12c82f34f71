//! 다종목 비교 엔진.
//!
//! 2~10개 시계열을 공통 날짜로 정렬해
//! - 첫 공통 날짜 = 100 기준의 정규화 성과 시계열
//! - 수익률/변동성/샤프 지표 표
//! - 일간 수익률 상관행렬
//!
//! 을 계산합니다. 정의되지 않는 통계는 0이 아니라 `None`으로 보고합니다.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stockcast_core::{AnalysisError, AnalysisResult, ComparisonConfig, Series};
use tracing::{debug, warn};

use crate::correlation::{
    calculate_correlation_matrix, prices_to_log_returns, prices_to_returns, CorrelationMatrix,
};

/// 비교 가능한 최소 시계열 수.
pub const MIN_COMPARISON_SERIES: usize = 2;
/// 비교 가능한 최대 시계열 수.
pub const MAX_COMPARISON_SERIES: usize = 10;

/// 비교 엔진 파라미터.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonParams {
    /// 연율화 거래일 수 (기본: 252)
    pub trading_days_per_year: u32,
    /// 1개월 수익률 참조 거래일 수 (기본: 21)
    pub month_lookback: usize,
    /// 1주 수익률 참조 거래일 수 (기본: 5)
    pub week_lookback: usize,
}

impl Default for ComparisonParams {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            month_lookback: 21,
            week_lookback: 5,
        }
    }
}

impl From<&ComparisonConfig> for ComparisonParams {
    fn from(config: &ComparisonConfig) -> Self {
        Self {
            trading_days_per_year: config.trading_days_per_year,
            month_lookback: config.month_lookback,
            week_lookback: config.week_lookback,
        }
    }
}

/// 종목별 성과 지표.
///
/// 수익률과 변동성은 퍼센트 단위입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub ticker: String,
    /// 공통 구간 전체 수익률 (%)
    pub total_return_pct: f64,
    /// 1개월 수익률 (%), 참조 구간 부족 시 None
    pub return_1m_pct: Option<f64>,
    /// 1주 수익률 (%), 참조 구간 부족 시 None
    pub return_1w_pct: Option<f64>,
    /// 연율화 변동성 (%), 로그 수익률의 모표준편차 × √252
    pub annualized_volatility_pct: Option<f64>,
    /// 샤프 비율 (무위험 수익률 0), σ = 0이면 None
    pub sharpe: Option<f64>,
    pub last_close: f64,
}

/// 첫 공통 날짜 = 100 기준의 정규화 시계열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    pub ticker: String,
    /// `ComparisonReport::common_dates`와 같은 길이
    pub values: Vec<f64>,
}

/// 비교에서 제외된 시계열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedSeries {
    pub ticker: String,
    pub reason: String,
}

/// 비교 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub common_dates: Vec<NaiveDate>,
    pub normalized: Vec<NormalizedSeries>,
    pub metrics: Vec<PerformanceMetrics>,
    pub correlation: CorrelationMatrix,
    pub excluded: Vec<ExcludedSeries>,
}

/// 다종목 비교 엔진.
#[derive(Debug, Default)]
pub struct ComparisonEngine {
    params: ComparisonParams,
}

impl ComparisonEngine {
    pub fn new(params: ComparisonParams) -> Self {
        Self { params }
    }

    /// 시계열들을 비교합니다.
    ///
    /// # 에러
    /// - 시계열 수가 2~10을 벗어나거나 종목이 중복되면 `InvalidRequest`
    /// - 사용 가능한 시계열이 2개 미만이거나 공통 날짜가 2개 미만이면 `MisalignedComparison`
    pub fn compare(&self, series: &[Series]) -> AnalysisResult<ComparisonReport> {
        if !(MIN_COMPARISON_SERIES..=MAX_COMPARISON_SERIES).contains(&series.len()) {
            warn!(count = series.len(), "Rejected comparison request");
            return Err(AnalysisError::InvalidRequest(format!(
                "비교할 종목 수는 {}~{}개여야 합니다 (요청 {}개)",
                MIN_COMPARISON_SERIES,
                MAX_COMPARISON_SERIES,
                series.len()
            )));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = series.iter().find(|s| !seen.insert(s.ticker())) {
            return Err(AnalysisError::InvalidRequest(format!(
                "중복된 종목: {}",
                dup.ticker()
            )));
        }

        let mut excluded = Vec::new();
        let usable: Vec<&Series> = series
            .iter()
            .filter(|s| {
                if s.len() < 2 {
                    excluded.push(ExcludedSeries {
                        ticker: s.ticker().to_string(),
                        reason: format!("데이터 부족: {}개 (최소 2개)", s.len()),
                    });
                    false
                } else {
                    true
                }
            })
            .collect();

        if usable.len() < MIN_COMPARISON_SERIES {
            return Err(AnalysisError::MisalignedComparison(format!(
                "사용 가능한 종목이 {}개뿐입니다",
                usable.len()
            )));
        }

        let common_dates = common_dates(&usable);
        if common_dates.len() < 2 {
            return Err(AnalysisError::MisalignedComparison(format!(
                "공통 날짜가 {}개뿐입니다 (최소 2개)",
                common_dates.len()
            )));
        }

        let aligned: Vec<Vec<f64>> = usable
            .iter()
            .map(|s| aligned_closes(s, &common_dates))
            .collect();

        let normalized = usable
            .iter()
            .zip(&aligned)
            .map(|(s, closes)| NormalizedSeries {
                ticker: s.ticker().to_string(),
                values: normalize(closes),
            })
            .collect();

        let metrics = usable
            .iter()
            .zip(&aligned)
            .map(|(s, closes)| self.metrics(s.ticker(), closes))
            .collect();

        let symbols: Vec<&str> = usable.iter().map(|s| s.ticker()).collect();
        let correlation = calculate_correlation_matrix(&symbols, &aligned);

        debug!(
            series = usable.len(),
            excluded = excluded.len(),
            common_dates = common_dates.len(),
            "Comparison computed"
        );

        Ok(ComparisonReport {
            common_dates,
            normalized,
            metrics,
            correlation,
            excluded,
        })
    }

    /// 정렬된 종가로 성과 지표를 계산합니다. `closes`는 2개 이상이어야 합니다.
    pub fn metrics(&self, ticker: &str, closes: &[f64]) -> PerformanceMetrics {
        let first = closes[0];
        let last = closes[closes.len() - 1];
        let annualizer = (self.params.trading_days_per_year as f64).sqrt();

        let lookback_return = |bars: usize| {
            closes
                .len()
                .checked_sub(bars + 1)
                .map(|i| (last / closes[i] - 1.0) * 100.0)
        };

        let log_returns = prices_to_log_returns(closes);
        let annualized_volatility_pct =
            population_std(&log_returns).map(|sigma| sigma * annualizer * 100.0);

        let simple_returns = prices_to_returns(closes);
        let sharpe = population_std(&simple_returns).and_then(|sigma| {
            (sigma > 0.0).then(|| mean(&simple_returns) / sigma * annualizer)
        });

        PerformanceMetrics {
            ticker: ticker.to_string(),
            total_return_pct: (last / first - 1.0) * 100.0,
            return_1m_pct: lookback_return(self.params.month_lookback),
            return_1w_pct: lookback_return(self.params.week_lookback),
            annualized_volatility_pct,
            sharpe,
            last_close: last,
        }
    }
}

/// 모든 시계열에 존재하는 날짜 (오름차순).
fn common_dates(series: &[&Series]) -> Vec<NaiveDate> {
    let mut iter = series.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut common: BTreeSet<NaiveDate> = first.dates().into_iter().collect();
    for s in iter {
        let dates: BTreeSet<NaiveDate> = s.dates().into_iter().collect();
        common = common.intersection(&dates).copied().collect();
    }
    common.into_iter().collect()
}

fn aligned_closes(series: &Series, dates: &[NaiveDate]) -> Vec<f64> {
    let closes = series.closes_f64();
    dates
        .iter()
        .filter_map(|d| series.position_of(*d).map(|i| closes[i]))
        .collect()
}

fn normalize(closes: &[f64]) -> Vec<f64> {
    let base = closes[0];
    closes.iter().map(|c| c / base * 100.0).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// 모표준편차. 빈 입력이면 None.
fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}
