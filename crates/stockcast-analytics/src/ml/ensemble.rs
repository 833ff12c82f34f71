//! 트리 앙상블 전략.
//!
//! - `RandomForestStrategy`: 부트스트랩 표본으로 학습한 트리들의 평균
//! - `GradientBoostingStrategy`: 잔차에 순차 적합한 얕은 트리들의 축소 합
//!
//! 두 모델 모두 불순도 감소량 기반 feature 중요도를 제공합니다.

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stockcast_core::{AnalysisError, AnalysisResult, FeatureImportance, ImportanceMethod};
use tracing::debug;

use super::model::{check_training_set, normalize_weights, RegressionStrategy, TrainedModel};
use super::tree::{RegressionTree, TreeParams};

/// 랜덤 포레스트 전략.
#[derive(Debug, Clone)]
pub struct RandomForestStrategy {
    /// 트리 수
    pub n_trees: usize,
    /// 트리 최대 깊이
    pub max_depth: usize,
    /// 리프 최소 샘플 수
    pub min_samples_leaf: usize,
    /// 랜덤 시드 (트리 i는 seed + i)
    pub seed: u64,
}

/// 학습된 랜덤 포레스트.
#[derive(Debug, Clone)]
pub struct RandomForestModel {
    trees: Vec<RegressionTree>,
    importances: Vec<f64>,
}

impl RegressionStrategy for RandomForestStrategy {
    fn name(&self) -> &str {
        "Random Forest"
    }

    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> AnalysisResult<Box<dyn TrainedModel>> {
        check_training_set(x, y)?;
        if self.n_trees == 0 {
            return Err(AnalysisError::InvalidRequest(
                "트리 수는 0보다 커야 합니다".to_string(),
            ));
        }

        let (n, n_features) = x.dim();
        // 회귀 기본값: feature 수의 1/3
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            max_features: Some((n_features / 3).max(1)),
        };

        let trees: Vec<RegressionTree> = (0..self.n_trees)
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(i as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &bootstrap, &params, &mut rng)
            })
            .collect();

        let importances = sum_importances(&trees, n_features);

        debug!(trees = trees.len(), rows = n, "Random forest trained");

        Ok(Box::new(RandomForestModel { trees, importances }))
    }
}

impl TrainedModel for RandomForestModel {
    fn predict_one(&self, row: ArrayView1<f64>) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_one(row)).sum();
        sum / self.trees.len() as f64
    }

    fn feature_importance(&self, names: &[&str]) -> FeatureImportance {
        impurity_importance(&self.importances, names)
    }
}

/// 그래디언트 부스팅 전략 (제곱오차 손실).
#[derive(Debug, Clone)]
pub struct GradientBoostingStrategy {
    /// 부스팅 반복 수
    pub n_rounds: usize,
    /// 학습률 (축소 계수)
    pub learning_rate: f64,
    /// 트리 최대 깊이
    pub max_depth: usize,
    /// 리프 최소 샘플 수
    pub min_samples_leaf: usize,
    pub seed: u64,
}

/// 학습된 그래디언트 부스팅 모델.
#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
    importances: Vec<f64>,
}

impl RegressionStrategy for GradientBoostingStrategy {
    fn name(&self) -> &str {
        "Gradient Boosting"
    }

    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> AnalysisResult<Box<dyn TrainedModel>> {
        check_training_set(x, y)?;
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(AnalysisError::InvalidRequest(format!(
                "학습률은 (0, 1] 범위여야 합니다: {}",
                self.learning_rate
            )));
        }

        let (n, n_features) = x.dim();
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            max_features: None,
        };
        let indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let init = y.sum() / n as f64;
        let mut predictions = Array1::from_elem(n, init);
        let mut trees = Vec::with_capacity(self.n_rounds);

        for _ in 0..self.n_rounds {
            let residuals = &y - &predictions;
            let tree = RegressionTree::fit(x, residuals.view(), &indices, &params, &mut rng);
            for (pred, row) in predictions.iter_mut().zip(x.rows()) {
                *pred += self.learning_rate * tree.predict_one(row);
            }
            trees.push(tree);
        }

        let importances = sum_importances(&trees, n_features);

        debug!(rounds = trees.len(), rows = n, "Gradient boosting trained");

        Ok(Box::new(GradientBoostingModel {
            init,
            learning_rate: self.learning_rate,
            trees,
            importances,
        }))
    }
}

impl TrainedModel for GradientBoostingModel {
    fn predict_one(&self, row: ArrayView1<f64>) -> f64 {
        self.init
            + self
                .trees
                .iter()
                .map(|t| self.learning_rate * t.predict_one(row))
                .sum::<f64>()
    }

    fn feature_importance(&self, names: &[&str]) -> FeatureImportance {
        impurity_importance(&self.importances, names)
    }
}

fn sum_importances(trees: &[RegressionTree], n_features: usize) -> Vec<f64> {
    let mut total = vec![0.0; n_features];
    for tree in trees {
        for (acc, imp) in total.iter_mut().zip(tree.importances()) {
            *acc += imp;
        }
    }
    total
}

fn impurity_importance(raw: &[f64], names: &[&str]) -> FeatureImportance {
    match normalize_weights(raw) {
        Some(weights) => FeatureImportance::ranked(ImportanceMethod::ImpurityGain, names, &weights),
        None => FeatureImportance::unavailable("트리가 분할되지 않아 불순도 감소량이 없습니다"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn dataset() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((80, 3), |(i, j)| match j {
            0 => i as f64 / 80.0,
            1 => ((i * 37) % 80) as f64 / 80.0,
            _ => 0.5,
        });
        let y = x.column(0).mapv(|a| 3.0 * a) + &x.column(1).mapv(|b| 0.2 * b);
        (x, y)
    }

    #[test]
    fn test_forest_is_deterministic() {
        let (x, y) = dataset();
        let strategy = RandomForestStrategy {
            n_trees: 10,
            max_depth: 6,
            min_samples_leaf: 2,
            seed: 42,
        };

        let a = strategy.fit(x.view(), y.view()).unwrap().predict(x.view());
        let b = strategy.fit(x.view(), y.view()).unwrap().predict(x.view());
        assert_eq!(a, b);
    }

    #[test]
    fn test_forest_importance_favors_signal() {
        let (x, y) = dataset();
        let strategy = RandomForestStrategy {
            n_trees: 20,
            max_depth: 6,
            min_samples_leaf: 2,
            seed: 7,
        };
        let model = strategy.fit(x.view(), y.view()).unwrap();

        let importance = model.feature_importance(&["a", "b", "const"]);
        let top = importance.top(1);
        assert_eq!(top[0].0, "a");
    }

    #[test]
    fn test_boosting_reduces_error() {
        let (x, y) = dataset();
        let strategy = GradientBoostingStrategy {
            n_rounds: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            seed: 42,
        };
        let model = strategy.fit(x.view(), y.view()).unwrap();

        let mean = y.sum() / y.len() as f64;
        let baseline = y.mapv(|t| (t - mean).powi(2)).sum();
        let fitted = (&model.predict(x.view()) - &y).mapv(|e| e * e).sum();
        assert!(fitted < baseline * 0.05);
        assert!(model.feature_importance(&["a", "b", "const"]).is_available());
    }

    #[test]
    fn test_invalid_learning_rate() {
        let (x, y) = dataset();
        let strategy = GradientBoostingStrategy {
            n_rounds: 10,
            learning_rate: 0.0,
            max_depth: 3,
            min_samples_leaf: 1,
            seed: 1,
        };
        assert!(strategy.fit(x.view(), y.view()).is_err());
    }
}
