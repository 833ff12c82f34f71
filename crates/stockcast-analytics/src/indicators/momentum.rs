//! 모멘텀 지표 (Momentum Indicators).
//!
//! - RSI (Relative Strength Index), Wilder 평활

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 증분 RSI 상태 (Wilder 평활).
///
/// 처음 `period`개 상승/하락폭의 단순 평균으로 시드를 잡고,
/// 이후 `avg = (prev × (period - 1) + x) / period`로 갱신합니다.
/// 따라서 RSI는 인덱스 `period`부터 정의됩니다.
#[derive(Debug, Clone)]
pub struct WilderState {
    period: usize,
    prev_close: Option<Decimal>,
    deltas: usize,
    gain_sum: Decimal,
    loss_sum: Decimal,
    avg_gain: Option<Decimal>,
    avg_loss: Option<Decimal>,
    value: Option<Decimal>,
}

impl WilderState {
    /// 새 상태. `period`는 0보다 커야 합니다.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            deltas: 0,
            gain_sum: Decimal::ZERO,
            loss_sum: Decimal::ZERO,
            avg_gain: None,
            avg_loss: None,
            value: None,
        }
    }

    /// 종가 하나를 반영하고 현재 RSI를 반환합니다.
    pub fn update(&mut self, close: Decimal) -> Option<Decimal> {
        let Some(prev) = self.prev_close.replace(close) else {
            return None;
        };

        let delta = close - prev;
        let gain = delta.max(Decimal::ZERO);
        let loss = (-delta).max(Decimal::ZERO);
        self.deltas += 1;

        match (self.avg_gain, self.avg_loss) {
            (Some(prev_gain), Some(prev_loss)) => {
                let period = Decimal::from(self.period);
                let keep = Decimal::from(self.period - 1);
                self.avg_gain = Some((prev_gain * keep + gain) / period);
                self.avg_loss = Some((prev_loss * keep + loss) / period);
            }
            _ => {
                self.gain_sum += gain;
                self.loss_sum += loss;
                if self.deltas == self.period {
                    let period = Decimal::from(self.period);
                    self.avg_gain = Some(self.gain_sum / period);
                    self.avg_loss = Some(self.loss_sum / period);
                }
            }
        }

        self.value = match (self.avg_gain, self.avg_loss) {
            (Some(g), Some(l)) => Some(rsi_from_averages(g, l)),
            _ => None,
        };
        self.value
    }

    /// 현재 RSI.
    pub fn value(&self) -> Option<Decimal> {
        self.value
    }

    /// 현재 평균 하락폭.
    pub fn avg_loss(&self) -> Option<Decimal> {
        self.avg_loss
    }
}

/// 평균 상승/하락폭으로 RSI를 계산합니다.
///
/// `100 - 100 / (1 + RS)`와 같은 값인 `100 × gain / (gain + loss)`로 계산해
/// RS가 매우 커져도 넘치지 않습니다.
/// 하락이 없으면 100, 상승과 하락이 모두 없으면(횡보) 50입니다.
fn rsi_from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss == Decimal::ZERO {
        if avg_gain == Decimal::ZERO {
            return dec!(50);
        }
        return dec!(100);
    }
    dec!(100) * (avg_gain / (avg_gain + avg_loss))
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// # 반환
    /// 입력과 같은 길이의 0-100 값. 처음 period개는 None.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        if params.period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(rsi_series(prices, params.period))
    }
}

pub(crate) fn rsi_series(prices: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut state = WilderState::new(period);
    prices.iter().map(|p| state.update(*p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_defined_from_period() {
        let momentum = MomentumCalculator::new();
        let prices: Vec<Decimal> = (0..30)
            .map(|i| Decimal::from(100) + Decimal::from(i % 5) - dec!(2))
            .collect();

        let result = momentum.rsi(&prices, RsiParams::default()).unwrap();

        assert_eq!(result.len(), 30);
        assert!(result[13].is_none());
        assert!(result[14].is_some());
        for rsi in result.iter().flatten() {
            assert!(*rsi >= Decimal::ZERO && *rsi <= dec!(100));
        }
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let momentum = MomentumCalculator::new();
        let prices: Vec<Decimal> = (1..=20).map(Decimal::from).collect();

        let result = momentum.rsi(&prices, RsiParams::default()).unwrap();
        assert_eq!(result[19], Some(dec!(100)));
    }

    #[test]
    fn test_rsi_flat_is_neutral() {
        let momentum = MomentumCalculator::new();
        let prices = vec![dec!(50); 30];

        let result = momentum.rsi(&prices, RsiParams::default()).unwrap();
        assert_eq!(result[29], Some(dec!(50)));
    }

    #[test]
    fn test_rsi_wilder_seed() {
        // 상승 1, 하락 1 교대: 시드 평균 상승 = 하락 → 50
        let mut prices = vec![dec!(10)];
        for i in 0..14 {
            let last = *prices.last().unwrap();
            prices.push(if i % 2 == 0 { last + dec!(1) } else { last - dec!(1) });
        }
        let result = rsi_series(&prices, 14);
        assert_eq!(result[14], Some(dec!(50)));
    }

    #[test]
    fn test_rsi_short_input() {
        let result = rsi_series(&[dec!(1), dec!(2)], 14);
        assert_eq!(result, vec![None, None]);
    }
}
