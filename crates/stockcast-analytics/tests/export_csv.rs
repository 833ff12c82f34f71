//! CSV 내보내기 테스트
//!
//! 헤더, 빈 필드 처리, 출력 디렉토리 생성 검증

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockcast_analytics::presenter::{CsvExporter, INDICATOR_HEADER};
use stockcast_analytics::{ComparisonEngine, IndicatorEngine};
use stockcast_core::{business_days_after, ExportConfig, PricePoint, Series};
use tempfile::TempDir;

fn series(ticker: &str, n: usize, step: i64) -> Series {
    // 첫 영업일이 2024-01-02가 되도록 전날부터 시작
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let points = business_days_after(start, n)
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            PricePoint::from_close(d, dec!(100) + Decimal::from(step * i as i64), dec!(1000))
        })
        .collect();
    Series::new(ticker, points).unwrap()
}

fn read_records(path: &std::path::Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(|s| s.to_string()).collect())
        .collect();
    (header, rows)
}

#[test]
fn indicator_table_writes_empty_fields_for_warmup() {
    let dir = TempDir::new().unwrap();
    let exporter = CsvExporter::new(dir.path().join("out"));
    let set = IndicatorEngine::default().compute(&series("AAA", 30, 1));

    let path = exporter
        .export_file("AAA_indicators.csv", |e, file| e.write_indicators(file, &set))
        .unwrap();
    let (header, rows) = read_records(&path);

    assert_eq!(header, INDICATOR_HEADER.to_vec());
    assert_eq!(rows.len(), 30);

    // 첫 행: 종가 외 모든 지표가 비어 있음
    let first = &rows[0];
    assert_eq!(first[0], "2024-01-02");
    assert_eq!(first[1], "100");
    assert!(first[2..].iter().all(|f| f.is_empty()));

    // SMA20은 20번째 행부터 정의
    assert!(rows[18][2].is_empty());
    assert_eq!(rows[19][2], "109.5");
    // SMA50은 30행 안에서 정의되지 않으므로 신호도 비어 있음
    assert!(rows[29][3].is_empty());
    assert!(rows[29][12].is_empty());
}

#[test]
fn comparison_tables_round_trip_through_files() {
    let dir = TempDir::new().unwrap();
    let exporter = CsvExporter::from(&ExportConfig {
        output_dir: dir.path().to_string_lossy().into_owned(),
        delimiter: ',',
    });
    let report = ComparisonEngine::default()
        .compare(&[series("AAA", 10, 1), series("BBB", 10, 2)])
        .unwrap();

    let perf = exporter
        .export_file("performance.csv", |e, f| e.write_performance(f, &report))
        .unwrap();
    let (header, rows) = read_records(&perf);
    assert_eq!(header, vec!["date", "AAA", "BBB"]);
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0][1], "100.0000");
    assert_eq!(rows[0][2], "100.0000");

    let metrics = exporter
        .export_file("metrics.csv", |e, f| e.write_metrics(f, &report.metrics))
        .unwrap();
    let (header, rows) = read_records(&metrics);
    assert_eq!(header[0], "ticker");
    assert_eq!(rows.len(), 2);
    // 10개 데이터로는 1개월 수익률을 계산할 수 없음
    assert!(rows[0][2].is_empty());
    assert_eq!(rows[1][6], "118.0000");
}
