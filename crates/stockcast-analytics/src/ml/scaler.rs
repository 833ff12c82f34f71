//! Min-max 스케일링.
//!
//! 스케일러는 학습 구간에서만 적합되며, 검증/미래 데이터는 같은 통계로 변환만 합니다.
//! 범위를 벗어난 값은 잘라내지 않습니다.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use serde::{Deserialize, Serialize};

/// 열 단위 min-max 스케일러.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    mins: Array1<f64>,
    ranges: Array1<f64>,
}

impl MinMaxScaler {
    /// 행렬의 각 열에 적합합니다.
    pub fn fit(x: ArrayView2<f64>) -> Self {
        let mins = x.fold_axis(Axis(0), f64::INFINITY, |acc, v| acc.min(*v));
        let maxs = x.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, v| acc.max(*v));
        let ranges = &maxs - &mins;
        Self { mins, ranges }
    }

    /// 한 행을 변환합니다. 상수 열은 0이 됩니다.
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        Zip::from(&row)
            .and(&self.mins)
            .and(&self.ranges)
            .map_collect(|v, lo, range| scale(*v, *lo, *range))
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mut out = x.to_owned();
        for mut row in out.rows_mut() {
            Zip::from(&mut row)
                .and(&self.mins)
                .and(&self.ranges)
                .for_each(|v, lo, range| *v = scale(*v, *lo, *range));
        }
        out
    }
}

/// 타깃용 1차원 min-max 스케일러.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetScaler {
    min: f64,
    range: f64,
}

impl TargetScaler {
    pub fn fit(y: ArrayView1<f64>) -> Self {
        let min = y.fold(f64::INFINITY, |acc, v| acc.min(*v));
        let max = y.fold(f64::NEG_INFINITY, |acc, v| acc.max(*v));
        Self {
            min,
            range: max - min,
        }
    }

    pub fn transform(&self, value: f64) -> f64 {
        scale(value, self.min, self.range)
    }

    pub fn transform_all(&self, y: ArrayView1<f64>) -> Array1<f64> {
        y.mapv(|v| self.transform(v))
    }

    /// 원래 스케일로 되돌립니다.
    pub fn inverse(&self, scaled: f64) -> f64 {
        scaled * self.range + self.min
    }

    pub fn inverse_all(&self, scaled: &Array1<f64>) -> Array1<f64> {
        scaled.mapv(|v| self.inverse(v))
    }
}

fn scale(value: f64, min: f64, range: f64) -> f64 {
    if range > 0.0 {
        (value - min) / range
    } else {
        0.0
    }
}
