//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands (볼린저 밴드), 모표준편차 기준

use std::collections::VecDeque;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use stockcast_core::sqrt_decimal;

use super::{IndicatorError, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: Decimal,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: dec!(2.0),
        }
    }
}

impl BollingerBandsParams {
    pub fn validate(&self) -> IndicatorResult<()> {
        if self.period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.std_dev_multiplier < Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter(
                "표준편차 배수는 음수일 수 없습니다".to_string(),
            ));
        }
        Ok(())
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드 (MA + k × σ).
    pub upper: Option<Decimal>,
    /// 중간 밴드 (이동평균).
    pub middle: Option<Decimal>,
    /// 하단 밴드 (MA - k × σ).
    pub lower: Option<Decimal>,
    /// %B 지표 ((현재가 - 하단) / (상단 - 하단)), 밴드가 수렴하면 0.5.
    pub percent_b: Option<Decimal>,
}

/// 증분 볼린저 밴드 상태.
#[derive(Debug, Clone)]
pub struct BollingerState {
    params: BollingerBandsParams,
    window: VecDeque<Decimal>,
    last: BollingerBandsResult,
}

impl BollingerState {
    pub fn new(params: BollingerBandsParams) -> Self {
        Self {
            params,
            window: VecDeque::with_capacity(params.period + 1),
            last: BollingerBandsResult::default(),
        }
    }

    /// 종가 하나를 반영합니다.
    pub fn update(&mut self, price: Decimal) -> BollingerBandsResult {
        self.window.push_back(price);
        if self.window.len() > self.params.period {
            self.window.pop_front();
        }

        self.last = if self.window.len() == self.params.period {
            bands_for_window(
                self.window.make_contiguous(),
                price,
                self.params.std_dev_multiplier,
            )
        } else {
            BollingerBandsResult::default()
        };
        self.last
    }

    /// 마지막 결과.
    pub fn last(&self) -> BollingerBandsResult {
        self.last
    }
}

/// 윈도우 하나의 밴드를 계산합니다.
fn bands_for_window(window: &[Decimal], price: Decimal, multiplier: Decimal) -> BollingerBandsResult {
    let period_decimal = Decimal::from(window.len());

    // 이동평균 (중간 밴드)
    let sum: Decimal = window.iter().sum();
    let ma = sum / period_decimal;

    // 모분산
    let variance: Decimal = window
        .iter()
        .map(|&p| {
            let diff = p - ma;
            diff * diff
        })
        .sum::<Decimal>()
        / period_decimal;

    let std_dev = sqrt_decimal(variance);

    let deviation = multiplier * std_dev;
    let upper = ma + deviation;
    let lower = ma - deviation;

    let percent_b = if upper != lower {
        (price - lower) / (upper - lower)
    } else {
        dec!(0.5) // 밴드가 수렴하면 중립값
    };

    BollingerBandsResult {
        upper: Some(upper),
        middle: Some(ma),
        lower: Some(lower),
        percent_b: Some(percent_b),
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중간 밴드 = SMA(period)
    /// 상단/하단 밴드 = 중간 밴드 ± (k × σ), σ는 모표준편차
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        params.validate()?;
        Ok(bollinger_series(prices, params))
    }
}

pub(crate) fn bollinger_series(
    prices: &[Decimal],
    params: BollingerBandsParams,
) -> Vec<BollingerBandsResult> {
    let mut state = BollingerState::new(params);
    prices.iter().map(|p| state.update(*p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_closes() -> Vec<Decimal> {
        vec![
            dec!(102),
            dec!(104),
            dec!(103),
            dec!(106),
            dec!(108),
            dec!(107),
            dec!(110),
            dec!(112),
            dec!(111),
            dec!(114),
            dec!(116),
            dec!(115),
            dec!(117),
            dec!(119),
            dec!(118),
            dec!(120),
        ]
    }

    #[test]
    fn test_bollinger_bands() {
        let volatility = VolatilityIndicators::new();
        let close = sample_closes();

        let bb = volatility
            .bollinger_bands(
                &close,
                BollingerBandsParams {
                    period: 10,
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(bb.len(), close.len());

        // 처음 9개는 None
        assert!(bb[8].middle.is_none());
        assert!(bb[9].middle.is_some());

        // 상단 > 중간 > 하단
        if let (Some(u), Some(m), Some(l)) = (bb[15].upper, bb[15].middle, bb[15].lower) {
            assert!(u > m);
            assert!(m > l);
        }
    }

    #[test]
    fn test_bollinger_population_std() {
        // [2, 4, 4, 4, 5, 5, 7, 9]: 평균 5, 모표준편차 2
        let prices = vec![
            dec!(2),
            dec!(4),
            dec!(4),
            dec!(4),
            dec!(5),
            dec!(5),
            dec!(7),
            dec!(9),
        ];
        let bb = bollinger_series(
            &prices,
            BollingerBandsParams {
                period: 8,
                std_dev_multiplier: dec!(2),
            },
        );

        assert_eq!(bb[7].middle, Some(dec!(5)));
        assert!((bb[7].upper.unwrap() - dec!(9)).abs() < dec!(0.0000001));
        assert!((bb[7].lower.unwrap() - dec!(1)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_bollinger_collapses_on_flat_series() {
        let prices = vec![dec!(50); 25];
        let bb = bollinger_series(&prices, BollingerBandsParams::default());

        let last = bb[24];
        assert_eq!(last.upper, Some(dec!(50)));
        assert_eq!(last.middle, Some(dec!(50)));
        assert_eq!(last.lower, Some(dec!(50)));
        assert_eq!(last.percent_b, Some(dec!(0.5)));
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let volatility = VolatilityIndicators::new();
        let params = BollingerBandsParams {
            period: 20,
            std_dev_multiplier: dec!(-1),
        };
        assert!(volatility.bollinger_bands(&sample_closes(), params).is_err());
    }
}
