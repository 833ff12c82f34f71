//! 시장 데이터 타입.
//!
//! - `PricePoint` - 일봉 OHLCV 레코드
//! - `Series` - 한 종목의 날짜 오름차순 OHLCV 시계열
//!
//! 시계열은 외부 데이터 수집기가 공급하며 코어에서는 읽기 전용입니다.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{DecimalExt, Price, Volume};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 일봉 OHLCV 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가 (수정주가)
    pub close: Price,
    /// 거래량
    pub volume: Volume,
}

impl PricePoint {
    /// 새 레코드를 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Volume,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 시가/고가/저가를 종가와 같게 둔 레코드 (종가만 있는 데이터용).
    pub fn from_close(date: NaiveDate, close: Price, volume: Volume) -> Self {
        Self::new(date, close, close, close, close, volume)
    }
}

/// 한 종목의 OHLCV 시계열.
///
/// 불변식: 날짜는 엄격히 증가하고 모든 종가는 0보다 큽니다.
/// 생성 시 검증되며 이후에는 변경할 수 없습니다.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    ticker: String,
    points: Vec<PricePoint>,
}

impl Series {
    /// 검증된 시계열을 생성합니다.
    ///
    /// # 에러
    /// 날짜가 엄격히 증가하지 않거나 종가가 0 이하이면 `DegenerateSeries`.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> AnalysisResult<Self> {
        let ticker = ticker.into();

        for (i, point) in points.iter().enumerate() {
            if point.close <= Decimal::ZERO {
                return Err(AnalysisError::DegenerateSeries(format!(
                    "{}: {}의 종가가 0 이하입니다 ({})",
                    ticker, point.date, point.close
                )));
            }
            if point.volume < Decimal::ZERO {
                return Err(AnalysisError::DegenerateSeries(format!(
                    "{}: {}의 거래량이 음수입니다",
                    ticker, point.date
                )));
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(AnalysisError::DegenerateSeries(format!(
                    "{}: 날짜가 엄격히 증가하지 않습니다 ({} → {})",
                    ticker,
                    points[i - 1].date,
                    point.date
                )));
            }
        }

        Ok(Self { ticker, points })
    }

    /// 종목 코드.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// 전체 레코드.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 첫 레코드.
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// 마지막 레코드.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// 날짜 목록.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// f64 종가 목록.
    pub fn closes_f64(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close.to_f64_lossy()).collect()
    }

    /// f64 거래량 목록.
    pub fn volumes_f64(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.volume.to_f64_lossy()).collect()
    }

    /// 날짜의 인덱스 (이진 탐색).
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.points.binary_search_by_key(&date, |p| p.date).ok()
    }

    /// 해당 날짜의 종가.
    pub fn close_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.position_of(date).map(|i| self.points[i].close)
    }
}
