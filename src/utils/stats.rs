//! Statistical helpers for prediction intervals.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Error, Result};

/// Quantile of the standard normal distribution.
///
/// # Example
/// ```
/// use quickcast::utils::stats::quantile_normal;
///
/// let z = quantile_normal(0.975).unwrap();
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn quantile_normal(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "probability must be in (0, 1), got {p}"
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::InvalidParameter(e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}

/// Two-sided critical value for a central interval at `level`.
pub fn interval_z(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "interval level must be in (0, 1), got {level}"
        )));
    }
    quantile_normal((1.0 + level) / 2.0)
}

/// Mean of squared values, `None` when empty.
pub fn mean_square(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normal_quantiles_match_tables() {
        assert_relative_eq!(quantile_normal(0.5).unwrap(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(quantile_normal(0.975).unwrap(), 1.959964, epsilon = 1e-5);
        assert_relative_eq!(interval_z(0.8).unwrap(), 1.281552, epsilon = 1e-5);
    }

    #[test]
    fn out_of_range_probabilities_are_rejected() {
        assert!(quantile_normal(0.0).is_err());
        assert!(quantile_normal(1.0).is_err());
        assert!(interval_z(1.2).is_err());
        assert!(interval_z(f64::NAN).is_err());
    }

    #[test]
    fn mean_square_of_empty_is_none() {
        assert_eq!(mean_square(&[]), None);
        assert_relative_eq!(mean_square(&[1.0, -3.0]).unwrap(), 5.0);
    }
}
