//! 가격 예측 파이프라인.
//!
//! 이 모듈은 일봉 시계열로부터 다중 스텝 가격 예측을 만듭니다:
//!
//! - **Feature Engineering**: 누수 없는 지도학습 테이블 (`FeatureBuilder`)
//! - **회귀 전략**: 랜덤 포레스트, 그래디언트 부스팅, 릿지 선형 회귀
//! - **평가**: 순서 보존 교차검증, 후행 홀드아웃 RMSE/MAE/R²
//! - **롤아웃**: 예측값을 다시 입력으로 쓰는 영업일 단위 반복 예측
//!
//! # 아키텍처
//!
//! ```text
//! Series (OHLCV)
//!        │
//!        ▼
//! ┌─────────────────┐
//! │ IndicatorEngine │ ← RSI / MACD / 볼린저
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │ FeatureBuilder  │ ← t-1까지의 데이터만 사용
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────────┐
//! │ ForecastEngine  │ ──▶ │ RegressionStrategy   │
//! │ (CV / 롤아웃)    │     │ (RF / GBM / Ridge)   │
//! └────────┬────────┘     └──────────────────────┘
//!          ▼
//!   ForecastReport
//! ```
//!
//! # 예제
//!
//! ```ignore
//! use stockcast_analytics::ml::{ForecastEngine, ForecastParams};
//! use stockcast_core::ModelKind;
//!
//! let engine = ForecastEngine::default();
//! let strategy = engine.params().strategy();
//! let report = engine.forecast(&series, strategy.as_ref(), 30)?;
//! for point in &report.points {
//!     println!("{} {:.2} ({:+.2}%)", point.date, point.predicted_close, point.pct_change);
//! }
//! ```

pub mod ensemble;
pub mod features;
pub mod forecast;
pub mod linear;
pub mod metrics;
pub mod model;
pub mod scaler;
pub mod tree;
pub mod validation;

pub use ensemble::{
    GradientBoostingModel, GradientBoostingStrategy, RandomForestModel, RandomForestStrategy,
};
pub use features::{
    row_features, FeatureBuilder, FeatureRow, FeatureTable, CLOSE_WINDOW, FEATURE_COUNT,
    FEATURE_NAMES, VOLUME_WINDOW,
};
pub use forecast::{ForecastEngine, ForecastParams, MAX_HORIZON, MIN_HORIZON};
pub use linear::{RidgeModel, RidgeStrategy};
pub use metrics::RegressionMetrics;
pub use model::{strategy_for, RegressionStrategy, TrainedModel};
pub use scaler::{MinMaxScaler, TargetScaler};
pub use tree::{RegressionTree, TreeParams};
pub use validation::{Fold, TimeSeriesSplit};
