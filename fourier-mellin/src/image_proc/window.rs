//! Raised-cosine (Hann) apodization windows.
//!
//! Un-windowed FFTs treat the image as periodic, so the jump between opposite
//! edges leaks into the spectrum as a bright cross through DC. That cross does
//! not rotate with the image content and would dominate the log-polar map.

use ndarray::{Array1, Array2, ArrayView2};
use std::f64::consts::PI;

/// One-dimensional Hann window of length `n`.
///
/// Uses the symmetric form `w(i) = 0.5 * (1 - cos(2πi / (n - 1)))`, which is
/// zero at both ends. A length-1 window is `[1.0]`.
pub fn hann_1d(n: usize) -> Array1<f64> {
    if n <= 1 {
        return Array1::ones(n);
    }
    let denom = (n - 1) as f64;
    Array1::from_shape_fn(n, |i| 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos()))
}

/// Separable two-dimensional Hann window with shape `(height, width)`.
pub fn hann_window(height: usize, width: usize) -> Array2<f64> {
    let rows = hann_1d(height);
    let cols = hann_1d(width);
    Array2::from_shape_fn((height, width), |(r, c)| rows[r] * cols[c])
}

/// Multiply an image by a Hann window of its own dimensions.
pub fn apply_hann(image: &ArrayView2<f64>) -> Array2<f64> {
    let (height, width) = image.dim();
    let mut windowed = hann_window(height, width);
    windowed *= image;
    windowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hann_1d_endpoints_and_peak() {
        let w = hann_1d(9);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[8], 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[4], 1.0, epsilon = 1e-12);
        // Symmetric
        for i in 0..9 {
            assert_relative_eq!(w[i], w[8 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_lengths() {
        assert_eq!(hann_1d(0).len(), 0);
        assert_eq!(hann_1d(1)[0], 1.0);
    }

    #[test]
    fn test_window_is_separable() {
        let w = hann_window(5, 7);
        let rows = hann_1d(5);
        let cols = hann_1d(7);
        assert_eq!(w.dim(), (5, 7));
        assert_relative_eq!(w[[2, 3]], rows[2] * cols[3], epsilon = 1e-15);
        assert_relative_eq!(w[[1, 5]], rows[1] * cols[5], epsilon = 1e-15);
    }

    #[test]
    fn test_apply_hann_zeroes_border() {
        let image = Array2::from_elem((8, 8), 3.0);
        let windowed = apply_hann(&image.view());
        assert_relative_eq!(windowed[[0, 4]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(windowed[[4, 7]], 0.0, epsilon = 1e-12);
        assert!(windowed[[4, 4]] > 2.0);
    }
}
