//! Summary statistics over repeated estimates.

/// Arithmetic mean of a slice. Returns NaN if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation (N denominator). Returns NaN if empty.
pub fn population_std(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let m = mean(data);
    let var = data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64;
    var.sqrt()
}

/// `(mean, population_std)` in one call.
pub fn mean_std(data: &[f64]) -> (f64, f64) {
    (mean(data), population_std(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_std_uses_n_denominator() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let (m, s) = mean_std(&data);
        assert!((m - 5.0).abs() < 1e-12);
        assert!((s - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_nan() {
        assert!(mean(&[]).is_nan());
        assert!(population_std(&[]).is_nan());
    }

    #[test]
    fn constant_input_has_zero_spread() {
        assert_eq!(population_std(&[3.5; 10]), 0.0);
    }
}
