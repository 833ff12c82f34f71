//! 회귀 평가 지표.

use ndarray::{s, ArrayView1};
use serde::{Deserialize, Serialize};

/// RMSE / MAE / R².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    /// 실제값 분산이 0이면 `None`
    pub r2: Option<f64>,
}

impl RegressionMetrics {
    /// 실제값과 예측값으로 지표를 계산합니다. 길이가 다르면 짧은 쪽에 맞춥니다.
    pub fn regression(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Self {
        let n = y_true.len().min(y_pred.len());
        if n == 0 {
            return Self {
                rmse: 0.0,
                mae: 0.0,
                r2: None,
            };
        }
        let y_true = y_true.slice(s![..n]);
        let errors = &y_true - &y_pred.slice(s![..n]);

        let ss_res = errors.mapv(|e| e * e).sum();
        let mae = errors.mapv(f64::abs).sum() / n as f64;

        let mean = y_true.sum() / n as f64;
        let ss_tot = y_true.mapv(|t| (t - mean).powi(2)).sum();
        let r2 = (ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot);

        Self {
            rmse: (ss_res / n as f64).sqrt(),
            mae,
            r2,
        }
    }
}

/// 평균 제곱근 오차.
pub fn rmse(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
    RegressionMetrics::regression(y_true, y_pred).rmse
}
