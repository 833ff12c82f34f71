//! 지표에서 파생되는 이산 신호.
//!
//! - `Signal` - SMA 단기/중기 교차 신호
//! - `RsiZone` - RSI 과매수/과매도 구간
//! - `TrendStrength` - 중기 이동평균 대비 추세 강도

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 이동평균 교차 매매 신호.
///
/// `Undefined`는 교차 판단에 필요한 값이 하나라도 없을 때입니다.
/// 화면에는 HOLD로 표시되지만 내부적으로는 구분됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    /// 골든 크로스 (단기선이 중기선을 상향 돌파)
    Buy,
    /// 데드 크로스 (단기선이 중기선을 하향 돌파)
    Sell,
    /// 교차 없음
    Hold,
    /// 판단 불가 (이력 부족)
    Undefined,
}

impl Signal {
    /// 교차 판단이 가능했는지 확인합니다.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Signal::Undefined)
    }

    /// 정의된 신호의 코드. `Undefined`이면 `None`.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Signal::Buy => Some("BUY"),
            Signal::Sell => Some("SELL"),
            Signal::Hold => Some("HOLD"),
            Signal::Undefined => None,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code().unwrap_or("HOLD"))
    }
}

/// RSI 구간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiZone {
    /// 과매수
    Overbought,
    /// 과매도
    Oversold,
    /// 중립
    Neutral,
}

impl RsiZone {
    /// RSI 값을 구간으로 분류합니다.
    ///
    /// 경계값은 중립으로 분류됩니다 (`rsi > overbought`, `rsi < oversold`).
    pub fn classify(rsi: Decimal, overbought: Decimal, oversold: Decimal) -> Self {
        if rsi > overbought {
            RsiZone::Overbought
        } else if rsi < oversold {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RsiZone::Overbought => "OVERBOUGHT",
            RsiZone::Oversold => "OVERSOLD",
            RsiZone::Neutral => "NEUTRAL",
        }
    }
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 중기 이동평균 대비 추세 강도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendStrength {
    /// 종가가 중기 이동평균 위
    Bullish,
    /// 종가가 중기 이동평균 이하
    Bearish,
}

impl TrendStrength {
    pub fn from_close(close: Decimal, sma_medium: Decimal) -> Self {
        if close > sma_medium {
            TrendStrength::Bullish
        } else {
            TrendStrength::Bearish
        }
    }
}

impl std::fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendStrength::Bullish => write!(f, "BULLISH"),
            TrendStrength::Bearish => write!(f, "BEARISH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_undefined_displays_as_hold() {
        assert_eq!(Signal::Undefined.to_string(), "HOLD");
        assert_eq!(Signal::Undefined.code(), None);
        assert!(!Signal::Undefined.is_defined());
        assert_eq!(Signal::Buy.to_string(), "BUY");
    }

    #[test]
    fn test_rsi_zone_boundaries() {
        let ob = dec!(70);
        let os = dec!(30);
        assert_eq!(RsiZone::classify(dec!(70.01), ob, os), RsiZone::Overbought);
        assert_eq!(RsiZone::classify(dec!(70), ob, os), RsiZone::Neutral);
        assert_eq!(RsiZone::classify(dec!(30), ob, os), RsiZone::Neutral);
        assert_eq!(RsiZone::classify(dec!(29.9), ob, os), RsiZone::Oversold);
    }

    #[test]
    fn test_trend_strength() {
        assert_eq!(
            TrendStrength::from_close(dec!(101), dec!(100)),
            TrendStrength::Bullish
        );
        assert_eq!(
            TrendStrength::from_close(dec!(100), dec!(100)),
            TrendStrength::Bearish
        );
    }
}
