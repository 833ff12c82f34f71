//! 릿지 선형 회귀 전략.
//!
//! 닫힌 해 β = (X'X + αI)⁻¹ X'y 를 중심화된 데이터로 풀고 절편을 복원합니다.
//! feature 중요도는 (min-max 스케일된 feature 기준) 계수 절댓값을 정규화한 값입니다.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use stockcast_core::{AnalysisError, AnalysisResult, FeatureImportance, ImportanceMethod};
use tracing::debug;

use super::model::{check_training_set, normalize_weights, RegressionStrategy, TrainedModel};

/// 릿지 회귀 전략.
#[derive(Debug, Clone)]
pub struct RidgeStrategy {
    /// 정규화 강도 (0이면 최소제곱)
    pub alpha: f64,
}

/// 학습된 릿지 모델.
#[derive(Debug, Clone)]
pub struct RidgeModel {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl RidgeModel {
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl RegressionStrategy for RidgeStrategy {
    fn name(&self) -> &str {
        "Linear Regression"
    }

    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> AnalysisResult<Box<dyn TrainedModel>> {
        if !(self.alpha >= 0.0) {
            return Err(AnalysisError::InvalidRequest(format!(
                "alpha는 0 이상이어야 합니다: {}",
                self.alpha
            )));
        }
        check_training_set(x, y)?;

        let n = x.nrows() as f64;
        let x_mean = x.sum_axis(Axis(0)) / n;
        let y_mean = y.sum() / n;
        let x_centered = &x - &x_mean;
        let y_centered = &y - y_mean;

        // X'X + αI, X'y
        let mut xtx = x_centered.t().dot(&x_centered);
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = x_centered.t().dot(&y_centered);

        let coefficients = cholesky_solve(&xtx, &xty).ok_or_else(|| {
            AnalysisError::DegenerateSeries(
                "정규 방정식이 양의 정부호가 아닙니다 (alpha를 늘리세요)".to_string(),
            )
        })?;
        let intercept = y_mean - x_mean.dot(&coefficients);

        debug!(features = x.ncols(), alpha = self.alpha, "Ridge regression trained");

        Ok(Box::new(RidgeModel {
            coefficients,
            intercept,
        }))
    }
}

impl TrainedModel for RidgeModel {
    fn predict_one(&self, row: ArrayView1<f64>) -> f64 {
        self.intercept + row.dot(&self.coefficients)
    }

    fn predict(&self, x: ArrayView2<f64>) -> Array1<f64> {
        x.dot(&self.coefficients) + self.intercept
    }

    fn feature_importance(&self, names: &[&str]) -> FeatureImportance {
        let magnitudes: Vec<f64> = self.coefficients.iter().map(|c| c.abs()).collect();
        match normalize_weights(&magnitudes) {
            Some(weights) => {
                FeatureImportance::ranked(ImportanceMethod::CoefficientMagnitude, names, &weights)
            }
            None => FeatureImportance::unavailable("모든 계수가 0입니다"),
        }
    }
}

/// 촐레스키 분해로 대칭 양의 정부호 시스템 A·x = b를 풉니다.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // 전진 대입: L·z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // 후진 대입: L'·x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_ridge_recovers_linear_relation() {
        let x = Array2::from_shape_fn((50, 2), |(i, j)| {
            if j == 0 {
                i as f64 / 50.0
            } else {
                ((i * 13) % 50) as f64 / 50.0
            }
        });
        let y = x.column(0).mapv(|a| 2.0 + 3.0 * a) - &x.column(1);

        let model = RidgeStrategy { alpha: 1e-9 }.fit(x.view(), y.view()).unwrap();

        let pred = model.predict_one(array![0.5, 0.5].view());
        assert!((pred - 3.0).abs() < 1e-4);

        let batch = model.predict(x.view());
        assert!((batch[10] - y[10]).abs() < 1e-4);

        let importance = model.feature_importance(&["a", "b"]);
        assert_eq!(importance.top(1)[0].0, "a");
    }

    #[test]
    fn test_ridge_shrinks_coefficients() {
        let x = Array2::from_shape_fn((30, 1), |(i, _)| i as f64 / 30.0);
        let y = x.column(0).mapv(|a| 10.0 * a);

        let weak = RidgeStrategy { alpha: 1e-6 }.fit(x.view(), y.view()).unwrap();
        let strong = RidgeStrategy { alpha: 10.0 }.fit(x.view(), y.view()).unwrap();

        let slope = |m: &dyn TrainedModel| {
            m.predict_one(array![1.0].view()) - m.predict_one(array![0.0].view())
        };
        assert!(slope(strong.as_ref()) < slope(weak.as_ref()));
    }

    #[test]
    fn test_constant_feature_without_alpha_is_degenerate() {
        let x = Array2::<f64>::ones((10, 1));
        let y = Array1::from_iter((0..10).map(|i| i as f64));

        let err = RidgeStrategy { alpha: 0.0 }.fit(x.view(), y.view()).err().unwrap();
        assert_eq!(err.kind(), stockcast_core::ErrorKind::DegenerateSeries);
    }

    #[test]
    fn test_negative_alpha_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        assert!(RidgeStrategy { alpha: -1.0 }.fit(x.view(), y.view()).is_err());
    }
}
