//! 지표 스냅샷 및 매매 신호 조회.

use std::path::PathBuf;

use anyhow::{Context, Result};
use stockcast_analytics::presenter::format_snapshot;
use stockcast_analytics::{CsvExporter, IndicatorEngine};
use stockcast_core::AppConfig;
use tracing::{info, warn};

use super::loader::load_series;

/// 신호 조회 설정.
#[derive(Debug)]
pub struct SignalsConfig {
    /// 입력 CSV 경로
    pub input: PathBuf,
    /// 종목 코드 (기본: 파일 이름)
    pub ticker: Option<String>,
    /// 지표 표 CSV 내보내기 여부
    pub export: bool,
}

/// 최신 스냅샷을 출력하고, 요청 시 지표 표를 내보냅니다.
pub fn run_signals(config: SignalsConfig, app: &AppConfig) -> Result<()> {
    let series = load_series(&config.input, config.ticker.as_deref())?;
    let engine = IndicatorEngine::from_config(&app.indicators)
        .context("Invalid indicator configuration")?;

    let set = engine.compute(&series);
    if !set.is_ready() {
        warn!(ticker = series.ticker(), points = series.len(), "Not enough data for indicators");
    }

    if let Some(snapshot) = engine.snapshot(&set) {
        print!("{}", format_snapshot(series.ticker(), &snapshot));
    }
    if let Some(i) = set.last_crossover() {
        println!("최근 크로스오버: {} ({})", set.signals[i], set.dates[i]);
    }

    if config.export {
        let exporter = CsvExporter::from(&app.export);
        let file_name = format!("{}_indicators.csv", series.ticker());
        let path = exporter
            .export_file(&file_name, |e, f| e.write_indicators(f, &set))
            .context("Failed to export indicator table")?;
        info!(path = %path.display(), "Indicator table exported");
        println!("저장 위치: {}", path.display());
    }

    Ok(())
}
