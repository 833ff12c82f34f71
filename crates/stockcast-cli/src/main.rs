//! 주가 분석/예측 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 최신 지표 스냅샷과 매매 신호
//! stockcast signals -i data/aapl.csv
//!
//! # 지표 표를 CSV로 내보내기
//! stockcast signals -i data/aapl.csv --export
//!
//! # 여러 종목 비교 (종목 코드는 파일 이름)
//! stockcast compare data/aapl.csv data/msft.csv data/spy.csv
//!
//! # 그래디언트 부스팅으로 30영업일 예측
//! stockcast forecast -i data/aapl.csv -m gradient_boosting --horizon 30
//!
//! # 예측 보고서 전체를 JSON으로
//! stockcast forecast -i data/aapl.csv --json > aapl_forecast.json
//!
//! # JSON 로그와 설정 파일 지정
//! stockcast --config config/stockcast.toml --log-format json forecast -i data/aapl.csv
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stockcast_core::{init_logging, AppConfig, LogConfig, LogFormat, ModelKind};
use tracing::{debug, error};

use stockcast_cli::commands::compare::{run_compare, CompareConfig};
use stockcast_cli::commands::forecast::{run_forecast, ForecastCommandConfig};
use stockcast_cli::commands::signals::{run_signals, SignalsConfig};

#[derive(Parser)]
#[command(name = "stockcast")]
#[command(about = "Stock indicator signals, comparison and price forecasting", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (없으면 기본값 + STOCKCAST__ 환경 변수)
    #[arg(long, global = true, default_value = "config/stockcast.toml")]
    config: PathBuf,

    /// 로그 형식 (pretty, json, compact). 설정 파일보다 우선합니다.
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 기술적 지표 스냅샷과 매매 신호
    Signals {
        /// 입력 CSV (date,open,high,low,close,volume)
        #[arg(short, long)]
        input: PathBuf,

        /// 종목 코드 (기본: 파일 이름)
        #[arg(short, long)]
        ticker: Option<String>,

        /// 지표 표를 CSV로 내보내기
        #[arg(long, default_value = "false")]
        export: bool,
    },

    /// 여러 종목의 성과/변동성/상관관계 비교 (2~10개)
    Compare {
        /// 입력 CSV 파일들 (종목 코드는 파일 이름)
        #[arg(required = true, num_args = 2..=10)]
        inputs: Vec<PathBuf>,

        /// 성과 표와 지표 요약을 CSV로 내보내기
        #[arg(long, default_value = "false")]
        export: bool,
    },

    /// 다중 스텝 가격 예측
    Forecast {
        /// 입력 CSV (date,open,high,low,close,volume)
        #[arg(short, long)]
        input: PathBuf,

        /// 종목 코드 (기본: 파일 이름)
        #[arg(short, long)]
        ticker: Option<String>,

        /// 모델 (random_forest, gradient_boosting, linear)
        #[arg(short, long)]
        model: Option<ModelKind>,

        /// 예측 기간 (영업일, 10~60)
        #[arg(long)]
        horizon: Option<usize>,

        /// 예측 표를 CSV로 내보내기
        #[arg(long, default_value = "false")]
        export: bool,

        /// 전체 보고서를 JSON으로 출력
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let app = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    init_logging(LogConfig::from_settings(&app.logging, cli.log_format))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    debug!(config = %cli.config.display(), "Configuration loaded");

    let result = match cli.command {
        Commands::Signals {
            input,
            ticker,
            export,
        } => run_signals(
            SignalsConfig {
                input,
                ticker,
                export,
            },
            &app,
        ),

        Commands::Compare { inputs, export } => run_compare(CompareConfig { inputs, export }, &app),

        Commands::Forecast {
            input,
            ticker,
            model,
            horizon,
            export,
            json,
        } => run_forecast(
            ForecastCommandConfig {
                input,
                ticker,
                model,
                horizon,
                export,
                json,
            },
            &app,
        ),
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}
