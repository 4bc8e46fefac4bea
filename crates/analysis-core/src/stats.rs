/// Small numeric helpers shared by the indicator and metric code.

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Compute sample standard deviation.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

/// Percentage change from `start` to `current`.
/// Returns `None` if `start` is zero or either value is not finite.
pub fn percent_change(start: f64, current: f64) -> Option<f64> {
    if start == 0.0 || !start.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - start) / start * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_std_dev_is_sample() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // population sd is 2.0, sample sd is sqrt(32/7)
        assert!((std_dev(&data) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(std_dev(&[1.0]), 0.0);
    }

    #[test]
    fn test_percent_change() {
        assert!((percent_change(100.0, 125.0).unwrap() - 25.0).abs() < 1e-12);
        assert!((percent_change(50.0, 40.0).unwrap() + 20.0).abs() < 1e-12);
        assert!(percent_change(0.0, 10.0).is_none());
        assert!(percent_change(f64::NAN, 10.0).is_none());
    }
}
