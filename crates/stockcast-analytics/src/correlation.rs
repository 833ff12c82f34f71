//! 상관계수 계산 모듈.
//!
//! 종목 간 일간 수익률의 Pearson 상관계수를 계산합니다.
//!
//! # 주요 기능
//!
//! - **Pearson 상관계수**: 두 수익률 시계열 간 선형 상관관계
//! - **상관행렬**: 모든 종목의 공통 날짜 구간에서 계산한 N×N 행렬
//!
//! 계산할 수 없는 쌍(수익률 2개 미만, 변동 없음)은 0이 아니라 `None`입니다.
//!
//! # 예시
//!
//! ```rust,ignore
//! use stockcast_analytics::correlation::calculate_correlation;
//!
//! let returns_a = vec![0.01, -0.02, 0.015, 0.005];
//! let returns_b = vec![0.008, -0.015, 0.012, 0.003];
//!
//! let corr = calculate_correlation(&returns_a, &returns_b);
//! ```

use serde::{Deserialize, Serialize};

/// 상관행렬 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// 종목 목록 (행/열 순서)
    pub symbols: Vec<String>,
    /// 상관계수 행렬 (N×N, -1.0 ~ 1.0), 계산 불가는 None
    pub matrix: Vec<Vec<Option<f64>>>,
    /// 공통 날짜 수
    pub period: usize,
}

impl CorrelationMatrix {
    /// 두 종목의 상관계수.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        self.matrix[i][j]
    }
}

/// Pearson 상관계수 계산.
///
/// `cov / sqrt(var_x × var_y)`로 계산하며 [-1, 1]로 제한합니다.
/// 같은 시계열끼리는 정확히 1.0이 됩니다.
///
/// # 반환
///
/// 상관계수, 데이터가 2개 미만이거나 한쪽 분산이 0이면 None
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;

    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for i in 0..x.len() {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // 변동 없음
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// 가격 시계열을 단순 수익률로 변환.
///
/// # 반환
///
/// 일간 수익률 벡터 (길이: prices.len() - 1)
pub fn prices_to_returns(prices: &[f64]) -> Vec<f64> {
    if prices.len() < 2 {
        return Vec::new();
    }

    prices
        .windows(2)
        .map(|w| {
            if w[0] == 0.0 {
                0.0
            } else {
                (w[1] - w[0]) / w[0]
            }
        })
        .collect()
}

/// 가격 시계열을 로그 수익률로 변환.
pub fn prices_to_log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// 상관행렬 계산.
///
/// 모든 종가는 같은 공통 날짜에 정렬되어 있어야 하며, 각 쌍은 그 구간의
/// 일간 수익률로 계산합니다. 대각선은 1.0입니다.
///
/// # 인자
///
/// * `symbols` - 종목 코드 (행/열 순서)
/// * `aligned_closes` - 공통 날짜에 정렬된 종목별 종가
pub fn calculate_correlation_matrix(
    symbols: &[&str],
    aligned_closes: &[Vec<f64>],
) -> CorrelationMatrix {
    let n = symbols.len().min(aligned_closes.len());
    let period = aligned_closes.iter().map(Vec::len).min().unwrap_or(0);
    let returns: Vec<Vec<f64>> = aligned_closes[..n]
        .iter()
        .map(|closes| prices_to_returns(&closes[..period]))
        .collect();

    let mut matrix = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            if i == j {
                // 자기 자신과의 상관계수는 1.0
                matrix[i][j] = Some(1.0);
            } else {
                let corr = calculate_correlation(&returns[i], &returns[j]);
                matrix[i][j] = corr;
                matrix[j][i] = corr; // 대칭
            }
        }
    }

    CorrelationMatrix {
        symbols: symbols[..n].iter().map(|s| s.to_string()).collect(),
        matrix,
        period,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_positive_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];

        let corr = calculate_correlation(&x, &y).unwrap();
        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![10.0, 8.0, 6.0, 4.0, 2.0];

        let corr = calculate_correlation(&x, &y).unwrap();
        assert!((corr + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_is_exactly_one() {
        let x = vec![0.013, -0.021, 0.0042, 0.017, -0.0093, 0.001];
        assert_eq!(calculate_correlation(&x, &x), Some(1.0));
    }

    #[test]
    fn test_constant_is_none() {
        assert_eq!(calculate_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(calculate_correlation(&[1.0], &[1.0]), None);
    }

    #[test]
    fn test_prices_to_returns() {
        let returns = prices_to_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_from_aligned_closes() {
        let a = vec![10.0, 11.0, 10.5, 12.0, 11.8, 12.5];
        let b = vec![20.0, 22.0, 21.0, 24.0, 23.6, 25.0];
        let c = vec![5.0, 5.0, 5.0, 5.0, 5.0, 5.0];

        let matrix = calculate_correlation_matrix(&["A", "B", "C"], &[a, b, c]);

        assert_eq!(matrix.period, 6);
        assert_eq!(matrix.get("A", "A"), Some(1.0));
        assert!(matrix.get("A", "B").unwrap() > 0.99);
        assert_eq!(matrix.get("B", "A"), matrix.get("A", "B"));
        // 변동 없는 종목은 None
        assert_eq!(matrix.get("A", "C"), None);
    }

    #[test]
    fn test_two_dates_leave_one_return() {
        let matrix = calculate_correlation_matrix(&["A", "B"], &[vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(matrix.period, 2);
        assert_eq!(matrix.get("A", "B"), None);
    }
}
