//! Small statistical helpers shared by the analytics stages.

/// Mean of a slice of values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n-1 denominator).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean_val = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean_val).powi(2)).sum();
    Some((sum_sq / (n - 1) as f64).sqrt())
}

/// Fractional returns between consecutive values.
///
/// Pairs with a zero denominator are dropped rather than coerced.
pub fn returns(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return Vec::new();
    }

    values
        .windows(2)
        .filter_map(|pair| {
            if pair[0] == 0.0 {
                None
            } else {
                Some((pair[1] - pair[0]) / pair[0])
            }
        })
        .collect()
}

/// Mean of the trailing `window` values, `None` when fewer are available.
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    mean(&values[values.len() - window..])
}
