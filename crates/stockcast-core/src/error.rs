//! 분석 파이프라인의 에러 타입.
//!
//! 모든 에러는 경계(프레젠테이션 계층)에서 복구 가능하며,
//! 종류별로 구분되어 구체적인 메시지를 표시할 수 있습니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 에러 종류.
///
/// 프레젠테이션 계층이 `AnalysisError`를 문자열 파싱 없이 분기할 수 있도록 제공합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InsufficientHistory,
    InsufficientTrainingData,
    InvalidHorizon,
    DegenerateSeries,
    MisalignedComparison,
    InvalidRequest,
    Export,
}

/// 핵심 분석 에러.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 지표/피처 윈도우를 채울 만큼의 이력이 없음
    #[error("이력 데이터 부족: 필요 {required}개, 제공 {provided}개")]
    InsufficientHistory { required: usize, provided: usize },

    /// 피처 생성 후 학습 가능한 행이 최소치 미만
    #[error("학습 데이터 부족: 필요 {required}행, 제공 {provided}행")]
    InsufficientTrainingData { required: usize, provided: usize },

    /// 예측 기간이 허용 범위를 벗어남
    #[error("잘못된 예측 기간: {requested}일 (허용 범위 {min}~{max}일)")]
    InvalidHorizon {
        requested: usize,
        min: usize,
        max: usize,
    },

    /// 분산 0, 비단조 날짜, 0 이하 가격 등 퇴화된 시계열
    #[error("퇴화된 시계열: {0}")]
    DegenerateSeries(String),

    /// 비교에 필요한 공통 날짜가 부족함
    #[error("비교 구간 불일치: {0}")]
    MisalignedComparison(String),

    /// 잘못된 요청 파라미터
    #[error("잘못된 요청: {0}")]
    InvalidRequest(String),

    /// 내보내기(파일/직렬화) 에러
    #[error("내보내기 에러: {0}")]
    Export(String),
}

/// 분석 작업을 위한 Result 타입.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    /// 에러 종류를 반환합니다.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InsufficientHistory { .. } => ErrorKind::InsufficientHistory,
            AnalysisError::InsufficientTrainingData { .. } => ErrorKind::InsufficientTrainingData,
            AnalysisError::InvalidHorizon { .. } => ErrorKind::InvalidHorizon,
            AnalysisError::DegenerateSeries(_) => ErrorKind::DegenerateSeries,
            AnalysisError::MisalignedComparison(_) => ErrorKind::MisalignedComparison,
            AnalysisError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            AnalysisError::Export(_) => ErrorKind::Export,
        }
    }

    /// 다른 데이터(더 긴 기간, 다른 종목)로 재시도하면 해결될 수 있는 에러인지 확인합니다.
    pub fn is_data_related(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientHistory { .. }
                | AnalysisError::InsufficientTrainingData { .. }
                | AnalysisError::DegenerateSeries(_)
                | AnalysisError::MisalignedComparison(_)
        )
    }

    /// 호출자 계약 위반(잘못된 파라미터)인지 확인합니다.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidHorizon { .. } | AnalysisError::InvalidRequest(_)
        )
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Export(err.to_string())
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        let err = AnalysisError::InvalidHorizon {
            requested: 5,
            min: 10,
            max: 60,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidHorizon);
        assert!(err.is_contract_violation());
        assert!(!err.is_data_related());
    }

    #[test]
    fn test_error_data_related() {
        let err = AnalysisError::InsufficientTrainingData {
            required: 60,
            provided: 12,
        };
        assert!(err.is_data_related());
        assert_eq!(err.to_string(), "학습 데이터 부족: 필요 60행, 제공 12행");

        let err = AnalysisError::Export("disk full".to_string());
        assert!(!err.is_data_related());
        assert_eq!(err.kind(), ErrorKind::Export);
    }
}
