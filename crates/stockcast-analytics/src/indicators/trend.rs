//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)
//!
//! EMA/MACD는 한 값씩 갱신되는 상태(`EmaState`, `MacdState`)로 구현되며,
//! 배치 계산과 예측 롤아웃의 증분 계산이 같은 점화식을 공유합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdParams {
    /// 파라미터를 검증합니다.
    pub fn validate(&self) -> IndicatorResult<()> {
        if self.fast_period == 0 || self.slow_period == 0 || self.signal_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "MACD 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "MACD 단기 기간({})은 장기 기간({})보다 짧아야 합니다",
                self.fast_period, self.slow_period
            )));
        }
        Ok(())
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<Decimal>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<Decimal>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<Decimal>,
}

/// 증분 EMA 상태.
///
/// 처음 `period`개 값의 SMA로 시드를 잡고, 이후 `k = 2 / (period + 1)`로 갱신합니다.
#[derive(Debug, Clone)]
pub struct EmaState {
    period: usize,
    multiplier: Decimal,
    seed_sum: Decimal,
    seen: usize,
    value: Option<Decimal>,
}

impl EmaState {
    /// 새 상태. `period`는 0보다 커야 합니다.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            multiplier: dec!(2) / Decimal::from(period + 1),
            seed_sum: Decimal::ZERO,
            seen: 0,
            value: None,
        }
    }

    /// 값 하나를 반영하고 현재 EMA를 반환합니다.
    pub fn update(&mut self, price: Decimal) -> Option<Decimal> {
        self.seen += 1;
        match self.value {
            None => {
                self.seed_sum += price;
                if self.seen == self.period {
                    self.value = Some(self.seed_sum / Decimal::from(self.period));
                }
            }
            Some(prev_ema) => {
                let ema = (price * self.multiplier) + (prev_ema * (Decimal::ONE - self.multiplier));
                self.value = Some(ema);
            }
        }
        self.value
    }

    /// 현재 EMA.
    pub fn value(&self) -> Option<Decimal> {
        self.value
    }
}

/// 증분 MACD 상태.
///
/// 시그널 라인은 정의된 MACD 값만 받아 `signal_period`개의 SMA로 시드를 잡습니다.
#[derive(Debug, Clone)]
pub struct MacdState {
    fast: EmaState,
    slow: EmaState,
    signal: EmaState,
    last: MacdResult,
}

impl MacdState {
    pub fn new(params: MacdParams) -> Self {
        Self {
            fast: EmaState::new(params.fast_period),
            slow: EmaState::new(params.slow_period),
            signal: EmaState::new(params.signal_period),
            last: MacdResult::default(),
        }
    }

    /// 종가 하나를 반영합니다.
    pub fn update(&mut self, price: Decimal) -> MacdResult {
        let fast = self.fast.update(price);
        let slow = self.slow.update(price);

        let macd = match (fast, slow) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        };
        let signal = macd.and_then(|m| self.signal.update(m));
        let histogram = match (macd, signal) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        };

        self.last = MacdResult {
            macd,
            signal,
            histogram,
        };
        self.last
    }

    /// 마지막 결과.
    pub fn last(&self) -> MacdResult {
        self.last
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// # 반환
    /// 입력과 같은 길이. 처음 period-1개는 None이며, 입력이 짧으면 전부 None입니다.
    pub fn sma(
        &self,
        prices: &[Decimal],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        if params.period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(sma_series(prices, params.period))
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k))
    /// k = 2 / (period + 1)
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        if params.period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(ema_series(prices, params.period))
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        params.validate()?;
        Ok(macd_series(prices, params))
    }
}

/// 검증된 기간으로 SMA를 계산합니다.
pub(crate) fn sma_series(prices: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let period_decimal = Decimal::from(period);

    (0..prices.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let sum: Decimal = prices[i + 1 - period..=i].iter().sum();
                Some(sum / period_decimal)
            }
        })
        .collect()
}

pub(crate) fn ema_series(prices: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut state = EmaState::new(period);
    prices.iter().map(|p| state.update(*p)).collect()
}

pub(crate) fn macd_series(prices: &[Decimal], params: MacdParams) -> Vec<MacdResult> {
    let mut state = MacdState::new(params);
    prices.iter().map(|p| state.update(*p)).collect()
}
