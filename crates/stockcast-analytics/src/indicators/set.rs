//! 날짜 정렬된 지표 집합과 최신 스냅샷.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockcast_core::{RsiZone, Signal, TrendStrength};

use super::stream::IndicatorPoint;
use super::trend::MacdResult;
use super::volatility::BollingerBandsResult;

/// 최소 필요 데이터 수. 이보다 짧으면 모든 지표가 정의되지 않습니다.
pub const MIN_INDICATOR_POINTS: usize = 2;

/// 지표 집합의 데이터 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataStatus {
    /// 계산 완료 (개별 값은 워밍업 구간에서 여전히 없을 수 있음)
    Ready,
    /// 데이터 부족으로 모든 값이 정의되지 않음
    InsufficientData { required: usize, provided: usize },
}

/// 날짜별로 정렬된 지표 값.
///
/// 모든 벡터는 `dates`와 같은 길이이며, 정의되지 않은 값은 `None`입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub status: DataStatus,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<Decimal>,
    /// 단기 이동평균 (기본 SMA20)
    pub sma_short: Vec<Option<Decimal>>,
    /// 중기 이동평균 (기본 SMA50)
    pub sma_medium: Vec<Option<Decimal>>,
    /// 장기 이동평균 (기본 SMA200)
    pub sma_long: Vec<Option<Decimal>>,
    pub rsi: Vec<Option<Decimal>>,
    pub macd: Vec<MacdResult>,
    pub bollinger: Vec<BollingerBandsResult>,
    pub signals: Vec<Signal>,
    pub rsi_zones: Vec<Option<RsiZone>>,
}

impl IndicatorSet {
    /// 모든 값이 정의되지 않은 집합 (데이터 부족).
    pub(crate) fn insufficient(dates: Vec<NaiveDate>, closes: Vec<Decimal>) -> Self {
        let n = dates.len();
        Self {
            status: DataStatus::InsufficientData {
                required: MIN_INDICATOR_POINTS,
                provided: n,
            },
            dates,
            closes,
            sma_short: vec![None; n],
            sma_medium: vec![None; n],
            sma_long: vec![None; n],
            rsi: vec![None; n],
            macd: vec![MacdResult::default(); n],
            bollinger: vec![BollingerBandsResult::default(); n],
            signals: vec![Signal::Undefined; n],
            rsi_zones: vec![None; n],
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.status == DataStatus::Ready
    }

    /// 인덱스 `i`의 모델 입력용 지표.
    pub fn point(&self, i: usize) -> IndicatorPoint {
        IndicatorPoint {
            rsi: self.rsi[i],
            macd: self.macd[i],
            bollinger: self.bollinger[i],
        }
    }

    /// 한 행으로 펼친 값 (표/CSV 출력용).
    pub fn row(&self, i: usize) -> IndicatorRow {
        IndicatorRow {
            date: self.dates[i],
            close: self.closes[i],
            sma_short: self.sma_short[i],
            sma_medium: self.sma_medium[i],
            sma_long: self.sma_long[i],
            rsi: self.rsi[i],
            macd: self.macd[i].macd,
            macd_signal: self.macd[i].signal,
            macd_hist: self.macd[i].histogram,
            boll_upper: self.bollinger[i].upper,
            boll_mid: self.bollinger[i].middle,
            boll_lower: self.bollinger[i].lower,
            signal: self.signals[i],
            rsi_zone: self.rsi_zones[i],
        }
    }

    /// 가장 최근 BUY/SELL 신호의 인덱스.
    pub fn last_crossover(&self) -> Option<usize> {
        self.signals
            .iter()
            .rposition(|s| matches!(s, Signal::Buy | Signal::Sell))
    }
}

/// 지표 집합의 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: Decimal,
    pub sma_short: Option<Decimal>,
    pub sma_medium: Option<Decimal>,
    pub sma_long: Option<Decimal>,
    pub rsi: Option<Decimal>,
    pub macd: Option<Decimal>,
    pub macd_signal: Option<Decimal>,
    pub macd_hist: Option<Decimal>,
    pub boll_upper: Option<Decimal>,
    pub boll_mid: Option<Decimal>,
    pub boll_lower: Option<Decimal>,
    pub signal: Signal,
    pub rsi_zone: Option<RsiZone>,
}

/// 시그널 패널용 최신 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSnapshot {
    pub date: NaiveDate,
    pub last_close: Decimal,
    /// 전일 대비 변화율 (%)
    pub change_1d_pct: Option<Decimal>,
    /// 1주 전 대비 변화율 (%)
    pub change_1w_pct: Option<Decimal>,
    pub sma_short: Option<Decimal>,
    pub sma_medium: Option<Decimal>,
    pub sma_long: Option<Decimal>,
    pub rsi: Option<Decimal>,
    pub rsi_zone: Option<RsiZone>,
    pub signal: Signal,
    /// 중기 이동평균이 없으면 `None`
    pub trend: Option<TrendStrength>,
}
