//! 예측 결과 타입.
//!
//! - `ForecastPoint` - 미래 영업일 하나의 예측값과 신뢰 밴드
//! - `EvaluationReport` - 홀드아웃/교차검증 오차와 피처 중요도
//! - `RolloutMetadata` - 롤아웃에 적용된 가정 (거래량 정책, 밴드 폭)
//! - `ForecastReport` - 한 번의 예측 요청 결과 전체

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 미래 영업일 하나의 예측.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 예측 날짜 (영업일)
    pub date: NaiveDate,
    /// 예측 종가
    pub predicted_close: f64,
    /// 하단 밴드
    pub lower_bound: f64,
    /// 상단 밴드
    pub upper_bound: f64,
    /// 마지막 실제 종가 대비 변화율 (%)
    pub pct_change: f64,
}

/// 시계열 교차검증 폴드 하나의 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldReport {
    /// 폴드 번호 (1부터)
    pub fold: usize,
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub validation_start: NaiveDate,
    pub validation_end: NaiveDate,
    pub train_rows: usize,
    pub validation_rows: usize,
    /// 원래 가격 스케일의 RMSE
    pub rmse: f64,
}

/// 피처 중요도 산출 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceMethod {
    /// 트리 분할의 불순도 감소량 합 (정규화)
    ImpurityGain,
    /// 스케일된 피처 기준 계수 절댓값 (정규화)
    CoefficientMagnitude,
}

/// 피처 중요도.
///
/// 산출할 수 없으면 0으로 채우지 않고 사유와 함께 `Unavailable`을 반환합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeatureImportance {
    Available {
        method: ImportanceMethod,
        /// (피처 이름, 가중치), 가중치 내림차순
        weights: Vec<(String, f64)>,
    },
    Unavailable {
        reason: String,
    },
}

impl FeatureImportance {
    /// 피처 이름과 가중치로 생성합니다. 가중치는 내림차순 정렬됩니다.
    pub fn ranked(method: ImportanceMethod, names: &[&str], weights: &[f64]) -> Self {
        let mut pairs: Vec<(String, f64)> = names
            .iter()
            .zip(weights.iter())
            .map(|(n, w)| (n.to_string(), *w))
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        FeatureImportance::Available {
            method,
            weights: pairs,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        FeatureImportance::Unavailable {
            reason: reason.into(),
        }
    }

    /// 상위 n개 피처.
    pub fn top(&self, n: usize) -> Vec<(String, f64)> {
        match self {
            FeatureImportance::Available { weights, .. } => {
                weights.iter().take(n).cloned().collect()
            }
            FeatureImportance::Unavailable { .. } => Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FeatureImportance::Available { .. })
    }
}

/// 모델 평가 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// 후행 홀드아웃 RMSE
    pub rmse: f64,
    /// 후행 홀드아웃 MAE
    pub mae: f64,
    /// 후행 홀드아웃 R² (타깃 분산이 0이면 `None`)
    pub r2: Option<f64>,
    /// 폴드 RMSE 평균
    pub cv_rmse: f64,
    /// 폴드별 결과
    pub folds: Vec<FoldReport>,
    /// 홀드아웃 행 수
    pub holdout_rows: usize,
    /// 피처 중요도
    pub feature_importance: FeatureImportance,
}

/// 합성 날짜의 거래량 처리 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumePolicy {
    /// 마지막 관측 거래량을 유지
    HoldLastObserved,
}

impl std::fmt::Display for VolumePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumePolicy::HoldLastObserved => write!(f, "hold last observed volume"),
        }
    }
}

/// 롤아웃에 적용된 가정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutMetadata {
    /// 모델 이름
    pub model: String,
    /// 예측 기간 (영업일)
    pub horizon: usize,
    /// 학습 행 수
    pub training_rows: usize,
    /// 마지막 실제 날짜
    pub last_date: NaiveDate,
    /// 마지막 실제 종가
    pub last_close: f64,
    /// 거래량 정책
    pub volume_policy: VolumePolicy,
    /// 합성 날짜에 사용된 거래량
    pub held_volume: f64,
    /// 밴드 폭 (예측값 대비 비율)
    pub band_pct: f64,
    /// 밴드가 통계적 구간이 아닌 고정 휴리스틱인지 여부
    pub band_is_heuristic: bool,
}

/// 과거 구간의 실제값과 모델 적합값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedValue {
    pub date: NaiveDate,
    pub actual: f64,
    /// 워밍업 구간이면 `None`
    pub fitted: Option<f64>,
}

/// 예측 요청 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub ticker: String,
    pub points: Vec<ForecastPoint>,
    pub evaluation: EvaluationReport,
    pub fitted: Vec<FittedValue>,
    pub metadata: RolloutMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_importance_ranked() {
        let fi = FeatureImportance::ranked(
            ImportanceMethod::ImpurityGain,
            &["lag_1", "rsi_14", "month"],
            &[0.2, 0.7, 0.1],
        );
        let top = fi.top(2);
        assert_eq!(top[0].0, "rsi_14");
        assert_eq!(top[1].0, "lag_1");
        assert!(fi.is_available());
    }

    #[test]
    fn test_feature_importance_unavailable_is_not_zero_filled() {
        let fi = FeatureImportance::unavailable("model has no importances");
        assert!(fi.top(5).is_empty());
        assert!(!fi.is_available());
        let json = serde_json::to_string(&fi).unwrap();
        assert!(json.contains("\"status\":\"unavailable\""));
    }
}
