//! 로컬 CSV 시세 파일 로더.
//!
//! 형식: `date,open,high,low,close,volume` (헤더 필수, 날짜는 YYYY-MM-DD).
//! 행 순서는 날짜 오름차순으로 정렬한 뒤 `Series` 불변식을 검증합니다.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use stockcast_core::{PricePoint, Series};
use tracing::debug;

/// CSV 한 행.
#[derive(Debug, Deserialize)]
struct OhlcvRecord {
    date: NaiveDate,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

/// 파일 이름(확장자 제외)을 대문자로 바꾼 기본 종목 코드.
pub fn ticker_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// CSV 파일에서 시계열을 로드합니다.
pub fn load_series(path: &Path, ticker: Option<&str>) -> Result<Series> {
    let ticker = ticker
        .map(|t| t.to_uppercase())
        .unwrap_or_else(|| ticker_from_path(path));

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?;

    let mut points = Vec::new();
    for (line, record) in reader.deserialize::<OhlcvRecord>().enumerate() {
        let r = record.with_context(|| {
            format!("Invalid CSV record at row {} in {}", line + 2, path.display())
        })?;
        points.push(PricePoint::new(r.date, r.open, r.high, r.low, r.close, r.volume));
    }
    points.sort_by_key(|p| p.date);

    debug!(ticker = %ticker, rows = points.len(), "CSV loaded");

    Series::new(ticker.as_str(), points)
        .with_context(|| format!("Invalid price series in {}", path.display()))
}

/// 여러 파일을 로드합니다. 종목 코드는 파일 이름에서 가져옵니다.
pub fn load_many(paths: &[impl AsRef<Path>]) -> Result<Vec<Series>> {
    paths.iter().map(|p| load_series(p.as_ref(), None)).collect()
}
