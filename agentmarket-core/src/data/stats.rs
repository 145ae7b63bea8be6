//! Small series statistics shared by the engine and the reference loader.
//!
//! Conventions follow the usual dataframe defaults: percentage changes drop
//! the undefined first element, and standard deviation is the sample
//! estimator (one degree of freedom).

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (`ddof = 1`). NaN when fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Percentage changes `p[i] / p[i-1] - 1` for `i >= 1`.
pub fn pct_change(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Sample standard deviation of the percentage changes of `prices`.
pub fn pct_change_std(prices: &[f64]) -> f64 {
    sample_std(&pct_change(prices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "actual={actual}, expected={expected}"
        );
    }

    #[test]
    fn mean_basic() {
        assert_approx(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn sample_std_uses_one_degree_of_freedom() {
        // Values 2,4,4,4,5,5,7,9: population std = 2, sample std = sqrt(32/7)
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_approx(sample_std(&v), (32.0_f64 / 7.0).sqrt());
    }

    #[test]
    fn sample_std_short_input_is_nan() {
        assert!(sample_std(&[]).is_nan());
        assert!(sample_std(&[1.0]).is_nan());
    }

    #[test]
    fn pct_change_drops_first() {
        let changes = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(changes.len(), 2);
        assert_approx(changes[0], 0.1);
        assert_approx(changes[1], -0.1);
    }

    #[test]
    fn constant_prices_have_zero_volatility() {
        assert_eq!(pct_change_std(&[5.0; 10]), 0.0);
    }
}
