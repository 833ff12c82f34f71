//! tracing 기반 로깅 초기화.
//!
//! 로그는 항상 stderr로 나가므로 stdout의 표/JSON 출력과 섞이지 않습니다.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 색상이 포함된 여러 줄 형식
    #[default]
    Pretty,
    Json,
    /// 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 레벨 필터 (예: "info", "stockcast_analytics=debug")
    pub level: String,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 설정 파일의 `[logging]` 섹션에서 만듭니다.
    ///
    /// 명령줄에서 받은 형식이 있으면 그것을 쓰고, 파일의 형식 문자열을
    /// 해석할 수 없으면 pretty로 둡니다.
    pub fn from_settings(settings: &LoggingConfig, format_override: Option<LogFormat>) -> Self {
        let format = format_override
            .or_else(|| settings.format.parse().ok())
            .unwrap_or_default();
        Self::new(settings.level.clone()).with_format(format)
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn output_layer(format: LogFormat) -> BoxedLayer {
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
    match format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// 전역 subscriber를 설치합니다.
///
/// `RUST_LOG`가 있으면 `config.level`보다 우선합니다.
///
/// ```no_run
/// use stockcast_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("debug").with_format(LogFormat::Json)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::registry()
        .with(output_layer(config.format))
        .with(filter)
        .try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "Logging initialized");
    Ok(())
}

/// 종목과 모델 이름을 필드로 가진 info span.
#[macro_export]
macro_rules! ticker_span {
    ($name:expr, $ticker:expr, $model:expr) => {
        tracing::info_span!($name, ticker = %$ticker, model = %$model)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_from_settings_prefers_override() {
        let settings = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
        };

        let from_file = LogConfig::from_settings(&settings, None);
        assert_eq!(from_file, LogConfig::new("debug").with_format(LogFormat::Json));

        let overridden = LogConfig::from_settings(&settings, Some(LogFormat::Compact));
        assert_eq!(overridden.format, LogFormat::Compact);
    }

    #[test]
    fn test_unknown_format_in_settings_falls_back_to_pretty() {
        let settings = LoggingConfig {
            level: "info".to_string(),
            format: "xml".to_string(),
        };
        assert_eq!(LogConfig::from_settings(&settings, None).format, LogFormat::Pretty);
    }
}
