//! 교체 가능한 회귀 전략.
//!
//! 예측 엔진은 모델 종류를 분기하지 않고 `RegressionStrategy`를 통해 학습합니다.
//! 새 전략은 이 트레이트만 구현하면 롤아웃 로직을 건드리지 않고 추가할 수 있습니다.

use ndarray::{Array1, ArrayView1, ArrayView2};
use stockcast_core::{AnalysisError, AnalysisResult, FeatureImportance, ModelKind};

use super::ensemble::{GradientBoostingStrategy, RandomForestStrategy};
use super::linear::RidgeStrategy;
use super::ForecastParams;

/// 학습 능력 {fit}.
pub trait RegressionStrategy: Send + Sync {
    /// 표시용 모델 이름.
    fn name(&self) -> &str;

    /// 스케일된 feature 행렬과 타깃으로 새 모델을 학습합니다.
    ///
    /// 학습된 모델은 이후 변경되지 않으며 요청 간에 공유되지 않습니다.
    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> AnalysisResult<Box<dyn TrainedModel>>;
}

/// 학습된 모델 {predict, featureImportance}.
pub trait TrainedModel: Send + Sync {
    /// 한 행을 예측합니다.
    fn predict_one(&self, row: ArrayView1<f64>) -> f64;

    /// 여러 행을 예측합니다.
    fn predict(&self, x: ArrayView2<f64>) -> Array1<f64> {
        x.rows().into_iter().map(|row| self.predict_one(row)).collect()
    }

    /// feature 중요도. 지원하지 않는 모델은 사유와 함께 `Unavailable`.
    fn feature_importance(&self, names: &[&str]) -> FeatureImportance {
        let _ = names;
        FeatureImportance::unavailable("이 모델은 feature 중요도를 제공하지 않습니다")
    }
}

/// 모델 종류에 맞는 전략을 생성합니다.
pub fn strategy_for(kind: ModelKind, params: &ForecastParams) -> Box<dyn RegressionStrategy> {
    match kind {
        ModelKind::RandomForest => Box::new(RandomForestStrategy {
            n_trees: params.forest_trees,
            max_depth: params.forest_max_depth,
            min_samples_leaf: params.min_samples_leaf,
            seed: params.seed,
        }),
        ModelKind::GradientBoosting => Box::new(GradientBoostingStrategy {
            n_rounds: params.boosting_rounds,
            learning_rate: params.learning_rate,
            max_depth: params.boosting_max_depth,
            min_samples_leaf: params.min_samples_leaf,
            seed: params.seed,
        }),
        ModelKind::Linear => Box::new(RidgeStrategy {
            alpha: params.ridge_alpha,
        }),
    }
}

/// 학습 행렬과 타깃의 크기를 검사합니다.
pub(crate) fn check_training_set(x: ArrayView2<f64>, y: ArrayView1<f64>) -> AnalysisResult<()> {
    if x.nrows() == 0 || x.ncols() == 0 || x.nrows() != y.len() {
        return Err(AnalysisError::InvalidRequest(format!(
            "학습 데이터 크기가 맞지 않습니다: X {}×{}, y {}개",
            x.nrows(),
            x.ncols(),
            y.len()
        )));
    }
    Ok(())
}

/// 가중치를 합이 1이 되도록 정규화합니다. 합이 0이면 `None`.
pub(crate) fn normalize_weights(weights: &[f64]) -> Option<Vec<f64>> {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        Some(weights.iter().map(|w| w / sum).collect())
    } else {
        None
    }
}
