//! Temperature-scaled softmax

/// Convert action values into choice probabilities.
///
/// `p(a) = exp(β·(U(a) − max U)) / Σ exp(β·(U(a′) − max U))`. Subtracting
/// the maximum keeps every exponent non-positive, so large β or large
/// utilities cannot overflow. β = 0 yields the uniform distribution.
///
/// Returns an empty vector for an empty input. If the values contain no
/// finite maximum the distribution falls back to uniform.
///
/// # Examples
///
/// ```
/// use levelk::solver::softmax;
///
/// let p = softmax(&[5.0, 5.0], 1.0);
/// assert!((p[0] - 0.5).abs() < 1e-12);
///
/// let p = softmax(&[10.0, 0.0], 1.0);
/// assert!((p[1] - 1.0 / (1.0 + 10f64.exp())).abs() < 1e-12);
/// ```
pub fn softmax(values: &[f64], beta: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return uniform(values.len());
    }

    let weights: Vec<f64> = values
        .iter()
        .map(|&value| (beta * (value - max)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return uniform(values.len());
    }
    weights.into_iter().map(|w| w / total).collect()
}

/// Equal probability over `n` actions.
pub fn uniform(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Expected value of `values` under `softmax(values, beta)`.
pub fn softmax_expectation(values: &[f64], beta: f64) -> f64 {
    softmax(values, beta)
        .iter()
        .zip(values)
        .map(|(p, v)| p * v)
        .sum()
}
