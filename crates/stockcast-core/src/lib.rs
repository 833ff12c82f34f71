//! # Stockcast Core
//!
//! 주가 분석/예측 파이프라인의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - OHLCV 시계열 (`PricePoint`, `Series`)
//! - 매매 신호 및 RSI 구간
//! - 예측 결과 및 평가 리포트
//! - 영업일 달력 유틸리티
//! - 설정 관리
//! - 로깅 인프라
//! - 구조화된 분석 에러

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
