//! 결과 표 변환 및 CSV 내보내기.
//!
//! 엔진 출력을 날짜(또는 종목)당 한 행의 평면 표로 만듭니다.
//! 정의되지 않은 값은 빈 필드로 기록하며 0으로 채우지 않습니다.
//!
//! # 헤더
//!
//! | 표 | 헤더 |
//! |----|------|
//! | 지표 | `date,close,sma20,sma50,sma200,rsi14,macd,macd_signal,macd_hist,boll_upper,boll_mid,boll_lower,signal,rsi_zone` |
//! | 성과 | `date,<ticker>...` |
//! | 지표 요약 | `ticker,total_return_pct,return_1m_pct,return_1w_pct,ann_volatility_pct,sharpe,last_close` |
//! | 예측 | `date,predicted_close,lower_bound,upper_bound,pct_change` |

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use stockcast_core::{AnalysisError, AnalysisResult, ExportConfig, ForecastPoint};
use tracing::info;

use crate::comparison::{ComparisonReport, PerformanceMetrics};
use crate::correlation::CorrelationMatrix;
use crate::indicators::{IndicatorSet, LatestSnapshot};

/// 지표 표 헤더.
pub const INDICATOR_HEADER: [&str; 14] = [
    "date",
    "close",
    "sma20",
    "sma50",
    "sma200",
    "rsi14",
    "macd",
    "macd_signal",
    "macd_hist",
    "boll_upper",
    "boll_mid",
    "boll_lower",
    "signal",
    "rsi_zone",
];

/// 지표 요약 표 헤더.
pub const METRICS_HEADER: [&str; 7] = [
    "ticker",
    "total_return_pct",
    "return_1m_pct",
    "return_1w_pct",
    "ann_volatility_pct",
    "sharpe",
    "last_close",
];

/// 예측 표 헤더.
pub const FORECAST_HEADER: [&str; 5] = [
    "date",
    "predicted_close",
    "lower_bound",
    "upper_bound",
    "pct_change",
];

/// 출력 소수 자릿수.
const DECIMAL_PLACES: u32 = 4;

/// CSV 내보내기.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
    delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for CsvExporter {
    fn from(config: &ExportConfig) -> Self {
        let delimiter = if config.delimiter.is_ascii() {
            config.delimiter as u8
        } else {
            b','
        };
        Self {
            output_dir: PathBuf::from(&config.output_dir),
            delimiter,
        }
    }
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            delimiter: b',',
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn writer<W: io::Write>(&self, inner: W) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(inner)
    }

    /// 지표 표를 기록합니다.
    pub fn write_indicators<W: io::Write>(&self, inner: W, set: &IndicatorSet) -> AnalysisResult<()> {
        let mut wtr = self.writer(inner);
        wtr.write_record(INDICATOR_HEADER).map_err(export_error)?;

        for i in 0..set.len() {
            let row = set.row(i);
            wtr.write_record([
                row.date.to_string(),
                decimal_field(Some(row.close)),
                decimal_field(row.sma_short),
                decimal_field(row.sma_medium),
                decimal_field(row.sma_long),
                decimal_field(row.rsi),
                decimal_field(row.macd),
                decimal_field(row.macd_signal),
                decimal_field(row.macd_hist),
                decimal_field(row.boll_upper),
                decimal_field(row.boll_mid),
                decimal_field(row.boll_lower),
                row.signal.code().unwrap_or("").to_string(),
                row.rsi_zone.map(|z| z.code()).unwrap_or("").to_string(),
            ])
            .map_err(export_error)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// 공통 날짜 기준 정규화 성과 표를 기록합니다.
    pub fn write_performance<W: io::Write>(
        &self,
        inner: W,
        report: &ComparisonReport,
    ) -> AnalysisResult<()> {
        let mut wtr = self.writer(inner);

        let mut header = vec!["date".to_string()];
        header.extend(report.normalized.iter().map(|s| s.ticker.clone()));
        wtr.write_record(&header).map_err(export_error)?;

        for (i, date) in report.common_dates.iter().enumerate() {
            let mut record = vec![date.to_string()];
            record.extend(
                report
                    .normalized
                    .iter()
                    .map(|s| float_field(s.values.get(i).copied())),
            );
            wtr.write_record(&record).map_err(export_error)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// 종목별 지표 요약 표를 기록합니다.
    pub fn write_metrics<W: io::Write>(
        &self,
        inner: W,
        metrics: &[PerformanceMetrics],
    ) -> AnalysisResult<()> {
        let mut wtr = self.writer(inner);
        wtr.write_record(METRICS_HEADER).map_err(export_error)?;

        for m in metrics {
            wtr.write_record([
                m.ticker.clone(),
                float_field(Some(m.total_return_pct)),
                float_field(m.return_1m_pct),
                float_field(m.return_1w_pct),
                float_field(m.annualized_volatility_pct),
                float_field(m.sharpe),
                float_field(Some(m.last_close)),
            ])
            .map_err(export_error)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// 예측 표를 기록합니다.
    pub fn write_forecast<W: io::Write>(
        &self,
        inner: W,
        points: &[ForecastPoint],
    ) -> AnalysisResult<()> {
        let mut wtr = self.writer(inner);
        wtr.write_record(FORECAST_HEADER).map_err(export_error)?;

        for p in points {
            wtr.write_record([
                p.date.to_string(),
                float_field(Some(p.predicted_close)),
                float_field(Some(p.lower_bound)),
                float_field(Some(p.upper_bound)),
                float_field(Some(p.pct_change)),
            ])
            .map_err(export_error)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// 출력 디렉터리 아래 `file_name`으로 파일을 만들고 `write`로 내용을 기록합니다.
    pub fn export_file<F>(&self, file_name: &str, write: F) -> AnalysisResult<PathBuf>
    where
        F: FnOnce(&Self, fs::File) -> AnalysisResult<()>,
    {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        let file = fs::File::create(&path)?;
        write(self, file)?;
        info!(path = %path.display(), "CSV exported");
        Ok(path)
    }
}

fn export_error(err: csv::Error) -> AnalysisError {
    AnalysisError::Export(err.to_string())
}

fn decimal_field(value: Option<Decimal>) -> String {
    value
        .map(|v| v.round_dp(DECIMAL_PLACES).normalize().to_string())
        .unwrap_or_default()
}

fn float_field(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", DECIMAL_PLACES as usize, v),
        _ => String::new(),
    }
}

fn display_opt(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}{}", v, suffix),
        _ => "-".to_string(),
    }
}

/// 시그널 패널용 최신 스냅샷 텍스트.
pub fn format_snapshot(ticker: &str, snapshot: &LatestSnapshot) -> String {
    let decimal = |v: Option<Decimal>| {
        v.map(|d| d.round_dp(2).to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    let mut out = String::new();
    let _ = writeln!(out, "=== {} ({}) ===", ticker, snapshot.date);
    let _ = writeln!(out, "종가        {}", snapshot.last_close.round_dp(2));
    let _ = writeln!(out, "1일 변화     {}%", decimal(snapshot.change_1d_pct));
    let _ = writeln!(out, "1주 변화     {}%", decimal(snapshot.change_1w_pct));
    let _ = writeln!(out, "SMA20       {}", decimal(snapshot.sma_short));
    let _ = writeln!(out, "SMA50       {}", decimal(snapshot.sma_medium));
    let _ = writeln!(out, "SMA200      {}", decimal(snapshot.sma_long));
    let _ = writeln!(
        out,
        "RSI14       {} ({})",
        decimal(snapshot.rsi),
        snapshot
            .rsi_zone
            .map(|z| z.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(out, "신호        {}", snapshot.signal);
    let _ = writeln!(
        out,
        "추세        {}",
        snapshot
            .trend
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    out
}

/// 종목별 지표 요약 표.
pub fn format_metrics_table(metrics: &[PerformanceMetrics]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>8} {:>12}",
        "종목", "총수익", "1M", "1W", "변동성", "샤프", "종가"
    );
    for m in metrics {
        let _ = writeln!(
            out,
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>8} {:>12.2}",
            m.ticker,
            display_opt(Some(m.total_return_pct), "%"),
            display_opt(m.return_1m_pct, "%"),
            display_opt(m.return_1w_pct, "%"),
            display_opt(m.annualized_volatility_pct, "%"),
            display_opt(m.sharpe, ""),
            m.last_close
        );
    }
    out
}

/// 상관관계 행렬 표.
pub fn format_correlation_table(matrix: &CorrelationMatrix) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<10}", "");
    for symbol in &matrix.symbols {
        let _ = write!(out, " {:>8}", symbol);
    }
    out.push('\n');

    for (symbol, row) in matrix.symbols.iter().zip(&matrix.matrix) {
        let _ = write!(out, "{:<10}", symbol);
        for value in row {
            let _ = write!(out, " {:>8}", display_opt(*value, ""));
        }
        out.push('\n');
    }
    out
}

/// 예측 표.
pub fn format_forecast_table(points: &[ForecastPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>12} {:>12} {:>12} {:>9}",
        "날짜", "예측", "하단", "상단", "변화율"
    );
    for p in points {
        let _ = writeln!(
            out,
            "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>8.2}%",
            p.date, p.predicted_close, p.lower_bound, p.upper_bound, p.pct_change
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_forecast_csv() {
        let points = vec![ForecastPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            predicted_close: 101.5,
            lower_bound: 96.425,
            upper_bound: 106.575,
            pct_change: 1.5,
        }];

        let mut buf = Vec::new();
        CsvExporter::default()
            .write_forecast(&mut buf, &points)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("date,predicted_close,lower_bound,upper_bound,pct_change")
        );
        assert_eq!(
            lines.next(),
            Some("2024-03-04,101.5000,96.4250,106.5750,1.5000")
        );
    }

    #[test]
    fn test_undefined_metrics_are_empty_fields() {
        let metrics = vec![PerformanceMetrics {
            ticker: "AAA".to_string(),
            total_return_pct: 10.0,
            return_1m_pct: None,
            return_1w_pct: Some(1.0),
            annualized_volatility_pct: Some(20.0),
            sharpe: None,
            last_close: 110.0,
        }];

        let mut buf = Vec::new();
        CsvExporter::default().write_metrics(&mut buf, &metrics).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text.lines().nth(1),
            Some("AAA,10.0000,,1.0000,20.0000,,110.0000")
        );
    }

    #[test]
    fn test_float_field() {
        assert_eq!(float_field(None), "");
        assert_eq!(float_field(Some(f64::NAN)), "");
        assert_eq!(float_field(Some(2.0)), "2.0000");
    }
}
