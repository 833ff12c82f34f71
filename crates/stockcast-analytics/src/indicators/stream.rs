//! 증분 지표 스트림.
//!
//! 예측 롤아웃은 예측된 종가를 하나씩 덧붙이며 다음 피처 행을 만듭니다.
//! 이 스트림은 배치 계산과 같은 상태 구조체(`WilderState`, `MacdState`,
//! `BollingerState`)를 사용하므로, 같은 종가 시퀀스에 대해 배치 결과와
//! 정확히 같은 값을 냅니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::momentum::WilderState;
use super::trend::{MacdResult, MacdState};
use super::volatility::{BollingerBandsResult, BollingerState};
use super::IndicatorParams;

/// 한 시점의 모델 입력용 지표 값.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub rsi: Option<Decimal>,
    pub macd: MacdResult,
    pub bollinger: BollingerBandsResult,
}

/// RSI/MACD/볼린저 밴드의 증분 상태.
#[derive(Debug, Clone)]
pub struct IndicatorStream {
    rsi: WilderState,
    macd: MacdState,
    bollinger: BollingerState,
    current: IndicatorPoint,
    len: usize,
}

impl IndicatorStream {
    /// 빈 스트림을 생성합니다.
    pub fn new(params: &IndicatorParams) -> Self {
        Self {
            rsi: WilderState::new(params.rsi.period),
            macd: MacdState::new(params.macd),
            bollinger: BollingerState::new(params.bollinger),
            current: IndicatorPoint::default(),
            len: 0,
        }
    }

    /// 과거 종가를 재생해 상태를 채운 스트림을 생성합니다.
    pub fn seeded(params: &IndicatorParams, closes: &[Decimal]) -> Self {
        let mut stream = Self::new(params);
        for close in closes {
            stream.push(*close);
        }
        stream
    }

    /// 종가 하나를 반영하고 그 시점의 지표를 반환합니다.
    pub fn push(&mut self, close: Decimal) -> IndicatorPoint {
        self.current = IndicatorPoint {
            rsi: self.rsi.update(close),
            macd: self.macd.update(close),
            bollinger: self.bollinger.update(close),
        };
        self.len += 1;
        self.current
    }

    /// 마지막으로 반영된 시점의 지표.
    pub fn current(&self) -> IndicatorPoint {
        self.current
    }

    /// 반영된 종가 수.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
