//! 정밀한 금융 계산을 위한 Decimal 유틸리티.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 거래량 타입.
pub type Volume = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// f64로 변환합니다. 표현할 수 없는 값은 NaN이 됩니다.
    fn to_f64_lossy(&self) -> f64;
}

impl DecimalExt for Decimal {
    fn to_f64_lossy(&self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

/// f64를 Decimal로 변환합니다. NaN/무한대는 None.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    }
}

/// Decimal 제곱근.
///
/// f64 제곱근으로 초기값을 잡고 뉴턴-랩슨으로 보정합니다.
/// 0 이하의 입력은 0을 반환합니다.
pub fn sqrt_decimal(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let two = Decimal::from(2);
    let mut x = value
        .to_f64()
        .and_then(|v| Decimal::from_f64(v.sqrt()))
        .filter(|x| *x > Decimal::ZERO)
        .unwrap_or(value);

    for _ in 0..4 {
        let next = (x + value / x) / two;
        if next == x {
            break;
        }
        x = next;
    }

    x
}
