//! 시계열 교차검증 분할.
//!
//! 확장 윈도우 방식입니다. 행을 `n_splits + 1`개 블록으로 나누고,
//! k번째 폴드는 앞의 k개 블록으로 학습하고 바로 다음 블록으로 검증합니다.
//! 검증 블록은 항상 학습 블록보다 뒤에 있습니다.

use std::ops::Range;

use stockcast_core::{AnalysisError, AnalysisResult};

/// 폴드 하나의 학습/검증 인덱스 범위.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Range<usize>,
    pub validation: Range<usize>,
}

/// 순서를 보존하는 K-폴드 분할기.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesSplit {
    n_splits: usize,
}

impl TimeSeriesSplit {
    pub fn new(n_splits: usize) -> AnalysisResult<Self> {
        if n_splits < 2 {
            return Err(AnalysisError::InvalidRequest(format!(
                "폴드 수는 2 이상이어야 합니다: {}",
                n_splits
            )));
        }
        Ok(Self { n_splits })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// `n`개 행에 대한 폴드들. 마지막 검증 블록은 남은 행을 모두 포함합니다.
    pub fn split(&self, n: usize) -> AnalysisResult<Vec<Fold>> {
        let block = n / (self.n_splits + 1);
        if block == 0 {
            return Err(AnalysisError::InsufficientTrainingData {
                required: self.n_splits + 1,
                provided: n,
            });
        }

        let folds = (1..=self.n_splits)
            .map(|k| {
                let train_end = block * k;
                let validation_end = if k == self.n_splits {
                    n
                } else {
                    train_end + block
                };
                Fold {
                    train: 0..train_end,
                    validation: train_end..validation_end,
                }
            })
            .collect();

        Ok(folds)
    }
}
