//! 지표 계산, 종목 비교, 가격 예측 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 (SMA/EMA, RSI, MACD, 볼린저 밴드)와 매매 신호
//! - 다종목 성과 비교와 상관관계 행렬
//! - 누수 없는 feature 생성과 회귀 기반 다중 스텝 예측
//! - 결과 표 변환 및 CSV 내보내기
//!
//! # Re-exports
//!
//! - [`indicators`]: 지표 엔진 (IndicatorEngine, IndicatorSet, IndicatorStream 등)
//! - [`comparison`]: 종목 비교 (ComparisonEngine, ComparisonReport 등)
//! - [`ml`]: 예측 파이프라인 (ForecastEngine, RegressionStrategy 등)
//! - [`presenter`]: 표/CSV 출력 (CsvExporter)

pub mod comparison;
pub mod correlation;
pub mod indicators;
pub mod ml;
pub mod presenter;

// Indicators 모듈 re-exports
pub use indicators::{
    // 변동성 지표
    BollingerBandsParams,
    BollingerBandsResult,
    DataStatus,
    EmaParams,
    IndicatorEngine,
    IndicatorError,
    IndicatorParams,
    IndicatorPoint,
    IndicatorResult,
    IndicatorRow,
    IndicatorSet,
    IndicatorStream,
    LatestSnapshot,
    MacdParams,
    MacdResult,
    MomentumCalculator,
    // 모멘텀 지표
    RsiParams,
    // 추세 지표
    SmaParams,
    TrendIndicators,
    VolatilityIndicators,
};

// Comparison re-export
pub use comparison::{
    ComparisonEngine, ComparisonParams, ComparisonReport, ExcludedSeries, NormalizedSeries,
    PerformanceMetrics,
};

// Correlation re-export
pub use correlation::{calculate_correlation, calculate_correlation_matrix, CorrelationMatrix};

// ML 모듈 re-exports
pub use ml::{
    strategy_for, FeatureBuilder, FeatureTable, ForecastEngine, ForecastParams,
    RegressionStrategy, TrainedModel, FEATURE_NAMES,
};

// Presenter re-export
pub use presenter::CsvExporter;
