//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 로컬 CSV 시세 파일 로더
//! - 지표/신호 조회
//! - 다종목 성과 비교
//! - 가격 예측

pub mod commands;

pub use commands::*;
