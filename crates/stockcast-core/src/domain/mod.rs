//! 분석 파이프라인의 도메인 모델.

mod forecast;
mod market_data;
mod signal;

pub use forecast::*;
pub use market_data::*;
pub use signal::*;
