//! 지표 기반 이산 신호.
//!
//! 모든 함수는 현재 값과 직전 값만 보는 무상태 함수입니다.

use rust_decimal::Decimal;
use stockcast_core::{RsiZone, Signal};

/// 단기/중기 이동평균 교차 신호를 계산합니다.
///
/// - 골든 크로스: `short[t-1] <= long[t-1]` 이고 `short[t] > long[t]` → BUY
/// - 데드 크로스: `short[t-1] >= long[t-1]` 이고 `short[t] < long[t]` → SELL
/// - 그 외 → HOLD
///
/// 네 값 중 하나라도 없으면 `Undefined`입니다. 첫 인덱스는 항상 `Undefined`.
pub fn crossover_signals(short: &[Option<Decimal>], long: &[Option<Decimal>]) -> Vec<Signal> {
    let n = short.len().min(long.len());
    (0..n)
        .map(|t| {
            if t == 0 {
                return Signal::Undefined;
            }
            crossover_at(short[t - 1], long[t - 1], short[t], long[t])
        })
        .collect()
}

/// 한 시점의 교차 신호.
pub fn crossover_at(
    prev_short: Option<Decimal>,
    prev_long: Option<Decimal>,
    short: Option<Decimal>,
    long: Option<Decimal>,
) -> Signal {
    let (Some(prev_short), Some(prev_long), Some(short), Some(long)) =
        (prev_short, prev_long, short, long)
    else {
        return Signal::Undefined;
    };

    let golden_cross = prev_short <= prev_long && short > long;
    let death_cross = prev_short >= prev_long && short < long;

    if golden_cross {
        Signal::Buy
    } else if death_cross {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// RSI 구간 시퀀스. RSI가 없으면 구간도 없습니다.
pub fn rsi_zones(
    rsi: &[Option<Decimal>],
    overbought: Decimal,
    oversold: Decimal,
) -> Vec<Option<RsiZone>> {
    rsi.iter()
        .map(|value| value.map(|v| RsiZone::classify(v, overbought, oversold)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_golden_and_death_cross() {
        let short = vec![Some(dec!(9)), Some(dec!(11)), Some(dec!(12)), Some(dec!(8))];
        let long = vec![Some(dec!(10)), Some(dec!(10)), Some(dec!(10)), Some(dec!(10))];

        let signals = crossover_signals(&short, &long);
        assert_eq!(
            signals,
            vec![Signal::Undefined, Signal::Buy, Signal::Hold, Signal::Sell]
        );
    }

    #[test]
    fn test_touch_then_cross_is_buy() {
        // 같음에서 위로 벌어지면 BUY
        assert_eq!(
            crossover_at(Some(dec!(10)), Some(dec!(10)), Some(dec!(11)), Some(dec!(10))),
            Signal::Buy
        );
        // 계속 같으면 HOLD
        assert_eq!(
            crossover_at(Some(dec!(10)), Some(dec!(10)), Some(dec!(10)), Some(dec!(10))),
            Signal::Hold
        );
    }

    #[test]
    fn test_missing_values_are_undefined() {
        assert_eq!(
            crossover_at(None, Some(dec!(10)), Some(dec!(11)), Some(dec!(10))),
            Signal::Undefined
        );
        assert_eq!(
            crossover_at(Some(dec!(9)), Some(dec!(10)), Some(dec!(11)), None),
            Signal::Undefined
        );
    }

    #[test]
    fn test_rsi_zones() {
        let zones = rsi_zones(
            &[None, Some(dec!(75)), Some(dec!(25)), Some(dec!(50))],
            dec!(70),
            dec!(30),
        );
        assert_eq!(
            zones,
            vec![
                None,
                Some(RsiZone::Overbought),
                Some(RsiZone::Oversold),
                Some(RsiZone::Neutral)
            ]
        );
    }
}
