//! Descriptive statistics and angle helpers.

/// Arithmetic mean; 0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Copy of `values` with the mean removed.
#[must_use]
pub fn demean(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    values.iter().map(|v| v - m).collect()
}

/// Pearson correlation coefficient of two equal-length series.
///
/// Returns 0 when either series has zero variance or the lengths differ.
#[must_use]
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    let mx = mean(x);
    let my = mean(y);

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom <= f64::MIN_POSITIVE {
        return 0.0;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// Population standard deviation (divide by N) around a given center.
#[must_use]
pub fn population_std_dev(deviations: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = deviations.len();
    if n == 0 {
        return 0.0;
    }
    (deviations.map(|d| d * d).sum::<f64>() / n as f64).sqrt()
}

/// Wrap an angle in degrees into `[0, 360)`.
#[inline]
#[must_use]
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed shortest angular difference `a - b` in degrees, in `[-180, 180)`.
#[inline]
#[must_use]
pub fn angle_difference_degrees(a: f64, b: f64) -> f64 {
    wrap_degrees(a - b + 180.0) - 180.0
}

/// Mean of angles (degrees) computed away from the 0/360 seam.
///
/// Every angle is moved so that `reference` lands on `offset`, the shifted
/// values are averaged arithmetically, and the mean is moved back. Works for
/// clusters narrower than `offset` on the low side of `reference`.
#[must_use]
pub fn shifted_angle_mean(angles: &[f64], reference: f64, offset: f64) -> f64 {
    if angles.is_empty() {
        return 0.0;
    }
    let shift = reference - offset;
    let shifted: Vec<f64> = angles.iter().map(|&a| wrap_degrees(a - shift)).collect();
    wrap_degrees(mean(&shifted) + shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_demean() {
        assert_eq!(mean(&[]), 0.0);
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
        let centered = demean(&[1.0, 2.0, 3.0, 6.0]);
        assert_relative_eq!(mean(&centered), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson() {
        let x: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 2.0).collect();
        let z: Vec<f64> = x.iter().map(|v| -0.5 * v).collect();
        assert_relative_eq!(pearson_correlation(&x, &y), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson_correlation(&x, &z), -1.0, epsilon = 1e-12);
        assert_eq!(pearson_correlation(&x, &vec![4.0; 50]), 0.0);
        assert_eq!(pearson_correlation(&x, &y[..10]), 0.0);
    }

    #[test]
    fn test_population_std_dev() {
        let devs = [2.0, -2.0, 2.0, -2.0];
        assert_relative_eq!(population_std_dev(devs.iter().copied()), 2.0);
        assert_eq!(population_std_dev(std::iter::empty::<f64>()), 0.0);
    }

    #[test]
    fn test_wrapping() {
        assert_relative_eq!(wrap_degrees(370.0), 10.0);
        assert_relative_eq!(wrap_degrees(-10.0), 350.0);
        assert_eq!(wrap_degrees(-1e-18), 0.0);
        assert_relative_eq!(angle_difference_degrees(1.0, 359.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(angle_difference_degrees(359.0, 1.0), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shifted_mean_across_seam() {
        let angles = [359.0, 1.0, 358.0, 2.0];
        let m = shifted_angle_mean(&angles, angles[0], 45.0);
        assert!(angle_difference_degrees(m, 0.0).abs() < 1e-9, "mean was {m}");
        // A naive mean would land near 180
        assert_relative_eq!(mean(&angles), 180.0);
    }

    #[test]
    fn test_shifted_mean_plain_cluster() {
        let angles = [36.0, 38.0, 37.0];
        assert_relative_eq!(shifted_angle_mean(&angles, 36.0, 45.0), 37.0, epsilon = 1e-9);
    }
}
