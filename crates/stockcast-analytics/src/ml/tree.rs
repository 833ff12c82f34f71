//! 회귀 트리 (분산 감소 분할).
//!
//! 랜덤 포레스트와 그래디언트 부스팅이 공유하는 CART 회귀 트리입니다.
//! 노드는 배열(arena)에 저장되며, 분할마다 감소한 제곱오차 합을
//! feature별 불순도 감소량으로 누적합니다.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// 분산이 이 값 이하이면 더 분할하지 않습니다.
const MIN_IMPURITY: f64 = 1e-12;

/// 트리 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeParams {
    /// 최대 깊이
    pub max_depth: usize,
    /// 리프 최소 샘플 수
    pub min_samples_leaf: usize,
    /// 노드마다 고려할 feature 수 (None이면 전체)
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// 최적 분할 후보.
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// 정렬된 인덱스 중 왼쪽에 들어가는 개수
    left_count: usize,
    /// 제곱오차 합 감소량
    gain: f64,
    /// 해당 feature 기준으로 정렬된 인덱스
    sorted: Vec<usize>,
}

/// 학습된 회귀 트리.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl RegressionTree {
    /// `indices`로 지정된 샘플(중복 허용)로 트리를 학습합니다.
    pub fn fit(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        indices: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = x.ncols();
        let mut tree = Self {
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };

        if indices.is_empty() {
            tree.nodes.push(Node::Leaf { value: 0.0 });
            return tree;
        }

        let mut builder = TreeBuilder {
            x: x.view(),
            y: y.view(),
            params,
            n_features,
            rng,
        };
        builder.build(&mut tree, indices.to_vec(), 0);
        tree
    }

    /// 한 행을 예측합니다.
    pub fn predict_one(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// feature별 누적 불순도 감소량 (정규화 전).
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    /// 리프 수.
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

struct TreeBuilder<'a> {
    x: ArrayView2<'a, f64>,
    y: ArrayView1<'a, f64>,
    params: &'a TreeParams,
    n_features: usize,
    rng: &'a mut StdRng,
}

impl TreeBuilder<'_> {
    /// 노드를 만들고 그 인덱스를 반환합니다.
    fn build(&mut self, tree: &mut RegressionTree, indices: Vec<usize>, depth: usize) -> usize {
        let n = indices.len();
        let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
            (s + self.y[i], sq + self.y[i] * self.y[i])
        });
        let mean = sum / n as f64;
        let sse = (sum_sq - sum * sum / n as f64).max(0.0);

        let node_idx = tree.nodes.len();
        tree.nodes.push(Node::Leaf { value: mean });

        if depth >= self.params.max_depth
            || n < 2 * self.params.min_samples_leaf.max(1)
            || sse / (n as f64) <= MIN_IMPURITY
        {
            return node_idx;
        }

        let Some(split) = self.best_split(&indices, sum, sum_sq) else {
            return node_idx;
        };

        tree.importances[split.feature] += split.gain;

        let (left_indices, right_indices) = split.sorted.split_at(split.left_count);
        let left = self.build(tree, left_indices.to_vec(), depth + 1);
        let right = self.build(tree, right_indices.to_vec(), depth + 1);

        tree.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_idx
    }

    fn best_split(&mut self, indices: &[usize], sum: f64, sum_sq: f64) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent_sse = sum_sq - sum * sum / n as f64;

        let mut features: Vec<usize> = (0..self.n_features).collect();
        if let Some(max_features) = self.params.max_features {
            features.shuffle(&mut *self.rng);
            features.truncate(max_features.clamp(1, self.n_features.max(1)));
        }

        let mut best: Option<SplitCandidate> = None;

        for feature in features {
            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            let mut best_here: Option<(usize, f64)> = None;

            for k in 1..n {
                let yi = self.y[sorted[k - 1]];
                left_sum += yi;
                left_sq += yi * yi;

                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                // 같은 값 사이에서는 분할하지 않음
                if self.x[[sorted[k - 1], feature]] >= self.x[[sorted[k], feature]] {
                    continue;
                }

                let right_sum = sum - left_sum;
                let right_sq = sum_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / k as f64;
                let right_sse = right_sq - right_sum * right_sum / (n - k) as f64;
                let gain = parent_sse - left_sse - right_sse;

                if gain > best_here.map(|(_, g)| g).unwrap_or(MIN_IMPURITY) {
                    best_here = Some((k, gain));
                }
            }

            if let Some((k, gain)) = best_here {
                if best.as_ref().map(|b| gain > b.gain).unwrap_or(true) {
                    let threshold =
                        (self.x[[sorted[k - 1], feature]] + self.x[[sorted[k], feature]]) / 2.0;
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        left_count: k,
                        gain,
                        sorted,
                    });
                }
            }
        }

        best
    }
}
