//! Interquartile-range outlier screening

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be ascending and non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Inclusive `(lower, upper)` bounds `q1 - k*iqr` and `q3 + k*iqr`.
///
/// Returns `None` when there are no values to measure.
pub fn iqr_bounds(values: &[f64], multiplier: f64) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
        assert_eq!(quantile(&sorted, 0.25), 1.75);
    }

    #[test]
    fn test_iqr_bounds() {
        let values = [10.0, 12.0, 11.0, 13.0, 12.0, 500.0];
        let (lower, upper) = iqr_bounds(&values, 1.5).unwrap();
        assert!(lower < 10.0);
        assert!(upper > 13.0);
        assert!(upper < 500.0);
    }

    #[test]
    fn test_iqr_bounds_empty() {
        assert_eq!(iqr_bounds(&[], 1.5), None);
    }

    #[test]
    fn test_single_value_bounds_collapse() {
        assert_eq!(iqr_bounds(&[5.0], 1.5), Some((5.0, 5.0)));
    }
}
