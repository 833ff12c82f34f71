//! 기술적 지표 모듈.
//!
//! 시그널 패널과 예측 피처에 사용되는 기술적 지표를 Decimal로 계산합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균 (Simple Moving Average)
//! - **EMA**: 지수 이동평균 (Exponential Moving Average), SMA 시드
//! - **MACD**: 이동평균 수렴/확산 (Moving Average Convergence Divergence)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Relative Strength Index), Wilder 평활
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 볼린저 밴드 (모표준편차)
//!
//! ## 신호
//! - SMA 단기/중기 교차 (BUY/SELL/HOLD/Undefined)
//! - RSI 과매수/과매도 구간
//!
//! # 사용 예시
//!
//! ```ignore
//! use stockcast_analytics::indicators::IndicatorEngine;
//!
//! let engine = IndicatorEngine::default();
//! let set = engine.compute(&series);
//! let snapshot = engine.snapshot(&set);
//! ```

pub mod momentum;
pub mod set;
pub mod signals;
pub mod stream;
pub mod trend;
pub mod volatility;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockcast_core::{
    decimal_from_f64, AnalysisError, IndicatorConfig, Series, TrendStrength,
};
use thiserror::Error;
use tracing::debug;

pub use momentum::{MomentumCalculator, RsiParams, WilderState};
pub use set::{DataStatus, IndicatorRow, IndicatorSet, LatestSnapshot, MIN_INDICATOR_POINTS};
pub use signals::{crossover_at, crossover_signals, rsi_zones};
pub use stream::{IndicatorPoint, IndicatorStream};
pub use trend::{EmaParams, EmaState, MacdParams, MacdResult, MacdState, SmaParams, TrendIndicators};
pub use volatility::{
    BollingerBandsParams, BollingerBandsResult, BollingerState, VolatilityIndicators,
};

/// 1주 변화율 참조 거래일 수.
const WEEK_BARS: usize = 5;

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

impl From<IndicatorError> for AnalysisError {
    fn from(err: IndicatorError) -> Self {
        AnalysisError::InvalidRequest(err.to_string())
    }
}

/// 지표 엔진 파라미터.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorParams {
    pub sma_short: SmaParams,
    pub sma_medium: SmaParams,
    pub sma_long: SmaParams,
    pub rsi: RsiParams,
    pub rsi_overbought: Decimal,
    pub rsi_oversold: Decimal,
    pub macd: MacdParams,
    pub bollinger: BollingerBandsParams,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: SmaParams { period: 20 },
            sma_medium: SmaParams { period: 50 },
            sma_long: SmaParams { period: 200 },
            rsi: RsiParams::default(),
            rsi_overbought: dec!(70),
            rsi_oversold: dec!(30),
            macd: MacdParams::default(),
            bollinger: BollingerBandsParams::default(),
        }
    }
}

impl IndicatorParams {
    /// 파라미터를 검증합니다.
    pub fn validate(&self) -> IndicatorResult<()> {
        for (name, period) in [
            ("sma_short", self.sma_short.period),
            ("sma_medium", self.sma_medium.period),
            ("sma_long", self.sma_long.period),
            ("rsi", self.rsi.period),
        ] {
            if period == 0 {
                return Err(IndicatorError::InvalidParameter(format!(
                    "{} 기간은 0보다 커야 합니다",
                    name
                )));
            }
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(IndicatorError::InvalidParameter(format!(
                "과매도 임계값({})은 과매수 임계값({})보다 작아야 합니다",
                self.rsi_oversold, self.rsi_overbought
            )));
        }
        self.macd.validate()?;
        self.bollinger.validate()
    }
}

impl TryFrom<&IndicatorConfig> for IndicatorParams {
    type Error = IndicatorError;

    fn try_from(config: &IndicatorConfig) -> Result<Self, Self::Error> {
        let to_decimal = |name: &str, value: f64| {
            decimal_from_f64(value).ok_or_else(|| {
                IndicatorError::InvalidParameter(format!("{}: 유한한 값이 아닙니다 ({})", name, value))
            })
        };

        let params = Self {
            sma_short: SmaParams {
                period: config.sma_short,
            },
            sma_medium: SmaParams {
                period: config.sma_medium,
            },
            sma_long: SmaParams {
                period: config.sma_long,
            },
            rsi: RsiParams {
                period: config.rsi_period,
            },
            rsi_overbought: to_decimal("rsi_overbought", config.rsi_overbought)?,
            rsi_oversold: to_decimal("rsi_oversold", config.rsi_oversold)?,
            macd: MacdParams {
                fast_period: config.macd_fast,
                slow_period: config.macd_slow,
                signal_period: config.macd_signal,
            },
            bollinger: BollingerBandsParams {
                period: config.bollinger_period,
                std_dev_multiplier: to_decimal("bollinger_multiplier", config.bollinger_multiplier)?,
            },
        };
        params.validate()?;
        Ok(params)
    }
}

/// 통합 지표 엔진.
///
/// 파라미터는 생성 시 검증되므로 `compute`는 실패하지 않습니다.
/// 짧은 입력은 에러 대신 데이터 부족 상태의 집합을 반환합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
}

impl IndicatorEngine {
    /// 검증된 파라미터로 엔진을 생성합니다.
    pub fn new(params: IndicatorParams) -> IndicatorResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// 설정에서 엔진을 생성합니다.
    pub fn from_config(config: &IndicatorConfig) -> IndicatorResult<Self> {
        Self::new(IndicatorParams::try_from(config)?)
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    // ==================== 개별 지표 ====================

    /// 단순 이동평균 (SMA) 계산.
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균 (EMA) 계산.
    pub fn ema(&self, prices: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.ema(prices, params)
    }

    /// MACD 계산.
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        self.trend.macd(prices, params)
    }

    /// RSI 계산. 0-100 사이 값.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.rsi(prices, params)
    }

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        self.volatility.bollinger_bands(prices, params)
    }

    // ==================== 통합 계산 ====================

    /// 시계열 전체의 지표 집합을 계산합니다.
    pub fn compute(&self, series: &Series) -> IndicatorSet {
        let dates = series.dates();
        let closes = series.closes();

        if closes.len() < MIN_INDICATOR_POINTS {
            debug!(
                ticker = series.ticker(),
                points = closes.len(),
                "Insufficient data for indicators"
            );
            return IndicatorSet::insufficient(dates, closes);
        }

        let p = &self.params;
        let sma_short = trend::sma_series(&closes, p.sma_short.period);
        let sma_medium = trend::sma_series(&closes, p.sma_medium.period);
        let sma_long = trend::sma_series(&closes, p.sma_long.period);
        let rsi = momentum::rsi_series(&closes, p.rsi.period);
        let macd = trend::macd_series(&closes, p.macd);
        let bollinger = volatility::bollinger_series(&closes, p.bollinger);
        let signals = crossover_signals(&sma_short, &sma_medium);
        let zones = rsi_zones(&rsi, p.rsi_overbought, p.rsi_oversold);

        debug!(
            ticker = series.ticker(),
            points = closes.len(),
            "Indicators computed"
        );

        IndicatorSet {
            status: DataStatus::Ready,
            dates,
            closes,
            sma_short,
            sma_medium,
            sma_long,
            rsi,
            macd,
            bollinger,
            signals,
            rsi_zones: zones,
        }
    }

    /// 마지막 날짜의 스냅샷. 빈 집합이면 `None`.
    pub fn snapshot(&self, set: &IndicatorSet) -> Option<LatestSnapshot> {
        let last = set.len().checked_sub(1)?;
        let last_close = set.closes[last];

        let change_pct = |bars: usize| {
            last.checked_sub(bars).and_then(|i| {
                let base = set.closes[i];
                (base != Decimal::ZERO).then(|| (last_close / base - Decimal::ONE) * dec!(100))
            })
        };

        Some(LatestSnapshot {
            date: set.dates[last],
            last_close,
            change_1d_pct: change_pct(1),
            change_1w_pct: change_pct(WEEK_BARS),
            sma_short: set.sma_short[last],
            sma_medium: set.sma_medium[last],
            sma_long: set.sma_long[last],
            rsi: set.rsi[last],
            rsi_zone: set.rsi_zones[last],
            signal: set.signals[last],
            trend: set.sma_medium[last].map(|sma| TrendStrength::from_close(last_close, sma)),
        })
    }

    /// 빈 증분 스트림.
    pub fn stream(&self) -> IndicatorStream {
        IndicatorStream::new(&self.params)
    }
}
