//! 가격 예측.

use std::path::PathBuf;

use anyhow::{Context, Result};
use stockcast_analytics::presenter::format_forecast_table;
use stockcast_analytics::{CsvExporter, ForecastEngine};
use stockcast_core::{AppConfig, FeatureImportance, ForecastReport, ModelKind};

use super::loader::load_series;

/// 출력할 상위 feature 수.
const TOP_FEATURES: usize = 5;

/// 예측 설정.
#[derive(Debug)]
pub struct ForecastCommandConfig {
    /// 입력 CSV 경로
    pub input: PathBuf,
    /// 종목 코드 (기본: 파일 이름)
    pub ticker: Option<String>,
    /// 모델 (기본: 설정 파일의 모델)
    pub model: Option<ModelKind>,
    /// 예측 기간 (기본: 설정 파일의 기간)
    pub horizon: Option<usize>,
    /// 예측 표 CSV 내보내기 여부
    pub export: bool,
    /// 전체 보고서를 JSON으로 출력
    pub json: bool,
}

/// 예측을 실행하고 평가 결과와 예측 표를 출력합니다.
pub fn run_forecast(config: ForecastCommandConfig, app: &AppConfig) -> Result<()> {
    let series = load_series(&config.input, config.ticker.as_deref())?;

    let mut app = app.clone();
    if let Some(model) = config.model {
        app.forecast.model = model;
    }
    let engine = ForecastEngine::from_config(&app).context("Invalid forecast configuration")?;
    let horizon = config.horizon.unwrap_or(engine.params().horizon);
    let strategy = engine.params().strategy();

    let report = engine
        .forecast(&series, strategy.as_ref(), horizon)
        .with_context(|| format!("Forecast failed for {}", series.ticker()))?;

    if config.json {
        let body = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", body);
        return export_points(&config, &app, &report);
    }

    let eval = &report.evaluation;
    println!(
        "=== {} / {} / {}일 ===",
        report.ticker, report.metadata.model, report.metadata.horizon
    );
    println!("학습 행: {}", report.metadata.training_rows);
    println!(
        "홀드아웃 ({}행): RMSE {:.4}  MAE {:.4}  R² {}",
        eval.holdout_rows,
        eval.rmse,
        eval.mae,
        eval.r2
            .map(|r| format!("{:.4}", r))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("교차검증 RMSE: {:.4}", eval.cv_rmse);
    for fold in &eval.folds {
        println!(
            "  fold {}: {} ~ {} → {} ~ {}  RMSE {:.4}",
            fold.fold,
            fold.train_start,
            fold.train_end,
            fold.validation_start,
            fold.validation_end,
            fold.rmse
        );
    }

    match &eval.feature_importance {
        FeatureImportance::Available { .. } => {
            println!("상위 feature:");
            for (name, weight) in eval.feature_importance.top(TOP_FEATURES) {
                println!("  {:<14} {:.4}", name, weight);
            }
        }
        FeatureImportance::Unavailable { reason } => {
            println!("feature 중요도 없음: {}", reason);
        }
    }

    println!();
    print!("{}", format_forecast_table(&report.points));
    println!(
        "\n밴드: ±{:.1}% (고정 휴리스틱), 거래량: {} ({:.0})",
        report.metadata.band_pct * 100.0,
        report.metadata.volume_policy,
        report.metadata.held_volume
    );

    export_points(&config, &app, &report)
}

fn export_points(config: &ForecastCommandConfig, app: &AppConfig, report: &ForecastReport) -> Result<()> {
    if !config.export {
        return Ok(());
    }
    let exporter = CsvExporter::from(&app.export);
    let file_name = format!("{}_forecast.csv", report.ticker);
    let path = exporter
        .export_file(&file_name, |e, f| e.write_forecast(f, &report.points))
        .context("Failed to export forecast table")?;
    eprintln!("저장 위치: {}", path.display());
    Ok(())
}
