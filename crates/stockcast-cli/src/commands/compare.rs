//! 다종목 성과 비교.

use std::path::PathBuf;

use anyhow::{Context, Result};
use stockcast_analytics::presenter::{format_correlation_table, format_metrics_table};
use stockcast_analytics::{ComparisonEngine, ComparisonParams, CsvExporter};
use stockcast_core::AppConfig;

use super::loader::load_many;

/// 비교 설정.
#[derive(Debug)]
pub struct CompareConfig {
    /// 입력 CSV 경로들 (종목 코드는 파일 이름)
    pub inputs: Vec<PathBuf>,
    /// 성과/지표 요약 CSV 내보내기 여부
    pub export: bool,
}

/// 비교 결과를 출력하고, 요청 시 성과 표와 지표 요약을 내보냅니다.
pub fn run_compare(config: CompareConfig, app: &AppConfig) -> Result<()> {
    let series = load_many(&config.inputs)?;
    let engine = ComparisonEngine::new(ComparisonParams::from(&app.comparison));

    let report = engine.compare(&series).context("Comparison failed")?;

    println!(
        "공통 구간: {} ~ {} ({}일)",
        report.common_dates[0],
        report.common_dates[report.common_dates.len() - 1],
        report.common_dates.len()
    );
    for excluded in &report.excluded {
        println!("제외: {} ({})", excluded.ticker, excluded.reason);
    }
    println!();
    print!("{}", format_metrics_table(&report.metrics));
    println!();
    print!("{}", format_correlation_table(&report.correlation));

    if config.export {
        let exporter = CsvExporter::from(&app.export);
        let perf = exporter
            .export_file("performance.csv", |e, f| e.write_performance(f, &report))
            .context("Failed to export performance table")?;
        let metrics = exporter
            .export_file("metrics.csv", |e, f| e.write_metrics(f, &report.metrics))
            .context("Failed to export metrics table")?;
        println!("\n저장 위치: {}, {}", perf.display(), metrics.display());
    }

    Ok(())
}
