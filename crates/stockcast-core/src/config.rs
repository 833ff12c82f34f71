//! 설정 관리.
//!
//! TOML 파일과 `STOCKCAST__` 접두사 환경 변수에서 애플리케이션 설정을 로드합니다.
//! 모든 섹션은 기본값을 가지므로 설정 파일 없이도 동작합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 기술적 지표 설정
    #[serde(default)]
    pub indicators: IndicatorConfig,
    /// 예측 엔진 설정
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// 종목 비교 설정
    #[serde(default)]
    pub comparison: ComparisonConfig,
    /// 내보내기 설정
    #[serde(default)]
    pub export: ExportConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 기술적 지표 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// 단기 이동평균 기간
    pub sma_short: usize,
    /// 중기 이동평균 기간
    pub sma_medium: usize,
    /// 장기 이동평균 기간
    pub sma_long: usize,
    /// RSI 기간
    pub rsi_period: usize,
    /// 과매수 임계값
    pub rsi_overbought: f64,
    /// 과매도 임계값
    pub rsi_oversold: f64,
    /// MACD 단기 EMA 기간
    pub macd_fast: usize,
    /// MACD 장기 EMA 기간
    pub macd_slow: usize,
    /// MACD 시그널 기간
    pub macd_signal: usize,
    /// 볼린저 밴드 기간
    pub bollinger_period: usize,
    /// 볼린저 밴드 표준편차 배수
    pub bollinger_multiplier: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_medium: 50,
            sma_long: 200,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
        }
    }
}

/// 회귀 모델 종류.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// 랜덤 포레스트 (결정 트리 앙상블)
    #[default]
    RandomForest,
    /// 그래디언트 부스팅
    GradientBoosting,
    /// 릿지 선형 회귀
    Linear,
}

impl std::str::FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "random_forest" | "rf" => Ok(Self::RandomForest),
            "gradient_boosting" | "gbm" => Ok(Self::GradientBoosting),
            "linear" | "ridge" | "linear_regression" => Ok(Self::Linear),
            _ => Err(format!(
                "Unknown model: {}. Supported: random_forest, gradient_boosting, linear",
                s
            )),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::RandomForest => write!(f, "Random Forest"),
            ModelKind::GradientBoosting => write!(f, "Gradient Boosting"),
            ModelKind::Linear => write!(f, "Linear Regression"),
        }
    }
}

/// 예측 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// 기본 모델
    pub model: ModelKind,
    /// 기본 예측 기간 (영업일)
    pub horizon: usize,
    /// 시계열 교차검증 폴드 수
    pub cv_folds: usize,
    /// 평가용 후행 홀드아웃 비율
    pub holdout_fraction: f64,
    /// 학습에 필요한 최소 행 수
    pub min_training_rows: usize,
    /// 신뢰 밴드 폭 (예측값 대비 비율)
    pub band_pct: f64,
    /// 랜덤 시드
    pub seed: u64,
    /// 랜덤 포레스트 트리 수
    pub forest_trees: usize,
    /// 랜덤 포레스트 최대 깊이
    pub forest_max_depth: usize,
    /// 리프 최소 샘플 수
    pub min_samples_leaf: usize,
    /// 부스팅 반복 수
    pub boosting_rounds: usize,
    /// 부스팅 학습률
    pub learning_rate: f64,
    /// 부스팅 트리 최대 깊이
    pub boosting_max_depth: usize,
    /// 릿지 정규화 강도
    pub ridge_alpha: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::RandomForest,
            horizon: 30,
            cv_folds: 5,
            holdout_fraction: 0.2,
            min_training_rows: 60,
            band_pct: 0.05,
            seed: 42,
            forest_trees: 100,
            forest_max_depth: 10,
            min_samples_leaf: 3,
            boosting_rounds: 300,
            learning_rate: 0.05,
            boosting_max_depth: 4,
            ridge_alpha: 1.0,
        }
    }
}

/// 종목 비교 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// 연간 거래일 수
    pub trading_days_per_year: u32,
    /// 1개월 수익률 참조 거래일 수
    pub month_lookback: usize,
    /// 1주 수익률 참조 거래일 수
    pub week_lookback: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            month_lookback: 21,
            week_lookback: 5,
        }
    }
}

/// 내보내기 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// CSV 출력 디렉토리
    pub output_dir: String,
    /// 필드 구분자
    pub delimiter: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: "exports".to_string(),
            delimiter: ',',
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("STOCKCAST")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 파일이 있으면 로드하고, 없으면 환경 변수와 기본값만 사용합니다.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("STOCKCAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_from_str() {
        assert_eq!("random-forest".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
        assert_eq!("GBM".parse::<ModelKind>().unwrap(), ModelKind::GradientBoosting);
        assert_eq!("Linear Regression".parse::<ModelKind>().unwrap(), ModelKind::Linear);
        assert!("lstm".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.indicators.sma_short, 20);
        assert_eq!(config.forecast.cv_folds, 5);
        assert_eq!(config.forecast.min_training_rows, 60);
        assert_eq!(config.comparison.trading_days_per_year, 252);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [forecast]
            model = "gradient_boosting"
            horizon = 20

            [export]
            delimiter = ";"
            "#,
        )
        .unwrap();

        assert_eq!(config.forecast.model, ModelKind::GradientBoosting);
        assert_eq!(config.forecast.horizon, 20);
        assert_eq!(config.forecast.cv_folds, 5);
        assert_eq!(config.export.delimiter, ';');
        assert_eq!(config.export.output_dir, "exports");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stockcast.toml");
        std::fs::write(&path, "[indicators]\nrsi_period = 21\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.indicators.rsi_period, 21);
        assert_eq!(config.indicators.sma_long, 200);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config.forecast.horizon, 30);
        assert_eq!(config.export.delimiter, ',');
    }
}
