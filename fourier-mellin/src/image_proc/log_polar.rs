//! Log-polar resampling of centered magnitude spectra.
//!
//! In log-polar coordinates a rotation about the origin becomes a shift along
//! the angle axis (rows) and a uniform scale becomes a shift along the
//! log-radius axis (columns). Both can then be measured with phase correlation.
//!
//! The radial scale factor `magnitude = width / ln(width)` maps pixel radius
//! to log-radius columns. The same [`LogPolarMapper`] must be used for the
//! forward remap and for converting a measured column shift back to a scale
//! factor, otherwise the recovered scale is biased.

use ndarray::{Array2, ArrayView2, Zip};
use std::f64::consts::PI;

use crate::error::{check_dimensions, Result};
use crate::image_proc::interp::bilinear_sample;
use crate::transform::image_center;

/// Geometry of a log-polar map for one array shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogPolarMapper {
    /// Number of angle rows, covering [0°, 360°)
    pub height: usize,
    /// Number of log-radius columns
    pub width: usize,
    /// Origin of the radial coordinate as `(x, y)`
    pub center: (f64, f64),
    /// Columns per unit of natural-log radius
    pub magnitude: f64,
}

impl LogPolarMapper {
    /// Standard mapper for a `(height, width)` spectrum, centered on DC.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        check_dimensions(height, width)?;
        Ok(Self {
            height,
            width,
            center: image_center(height, width),
            magnitude: width as f64 / (width as f64).ln(),
        })
    }

    /// Pixel radius sampled by log-radius column `col` (fractional allowed)
    pub fn radius(&self, col: f64) -> f64 {
        (col / self.magnitude).exp()
    }

    /// Angle in radians sampled by row `row` (fractional allowed)
    pub fn angle(&self, row: f64) -> f64 {
        row * 2.0 * PI / self.height as f64
    }

    /// Convert a row shift into degrees
    pub fn angle_degrees(&self, row_shift: f64) -> f64 {
        360.0 * row_shift / self.height as f64
    }

    /// Convert a column shift into a multiplicative radius factor
    pub fn scale_factor(&self, col_shift: f64) -> f64 {
        (col_shift / self.magnitude).exp()
    }

    /// Resample a centered spectrum into log-polar coordinates.
    ///
    /// Output cell `(row, col)` holds the bilinear sample at
    /// `center + radius(col) * (cos angle(row), sin angle(row))`.
    /// Source positions outside the spectrum read as zero.
    pub fn remap(&self, spectrum: &ArrayView2<f64>) -> Array2<f64> {
        debug_assert_eq!(spectrum.dim(), (self.height, self.width));
        let (cx, cy) = self.center;
        let mut out = Array2::<f64>::zeros((self.height, self.width));

        Zip::indexed(&mut out).par_for_each(|(row, col), value| {
            let r = self.radius(col as f64);
            let (sin_a, cos_a) = self.angle(row as f64).sin_cos();
            *value = bilinear_sample(spectrum, cx + r * cos_a, cy + r * sin_a, 0.0);
        });

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Radially symmetric bump centered on the DC pixel
    fn radial_bump(size: usize, radius: f64, sigma: f64) -> Array2<f64> {
        let c = (size / 2) as f64;
        Array2::from_shape_fn((size, size), |(r, col)| {
            let d = ((r as f64 - c).powi(2) + (col as f64 - c).powi(2)).sqrt();
            (-(d - radius).powi(2) / (2.0 * sigma * sigma)).exp()
        })
    }

    #[test]
    fn test_magnitude_constant() {
        let mapper = LogPolarMapper::new(128, 128).unwrap();
        assert_relative_eq!(mapper.magnitude, 128.0 / 128f64.ln(), epsilon = 1e-12);
        assert_eq!(mapper.center, (64.0, 64.0));
        // Forward and inverse use the same constant
        let col = 70.0;
        assert_relative_eq!(mapper.scale_factor(col), mapper.radius(col), epsilon = 1e-12);
    }

    #[test]
    fn test_angle_conversion() {
        let mapper = LogPolarMapper::new(180, 64).unwrap();
        assert_relative_eq!(mapper.angle_degrees(45.0), 90.0, epsilon = 1e-12);
        assert_relative_eq!(mapper.angle(90.0), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_ring_maps_to_column() {
        let size = 128;
        let ring_radius = 30.0;
        let spectrum = radial_bump(size, ring_radius, 1.5);
        let mapper = LogPolarMapper::new(size, size).unwrap();
        let map = mapper.remap(&spectrum.view());

        let expected_col = (mapper.magnitude * ring_radius.ln()).round() as usize;
        // Every angle row peaks at the ring's log-radius
        for row in (0..size).step_by(16) {
            let (best_col, _) = map
                .row(row)
                .iter()
                .enumerate()
                .fold((0, f64::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
            assert!(
                (best_col as i64 - expected_col as i64).abs() <= 1,
                "row {row}: peak at column {best_col}, expected {expected_col}"
            );
        }
    }

    #[test]
    fn test_scaling_shifts_columns() {
        let size = 128;
        let mapper = LogPolarMapper::new(size, size).unwrap();
        let small = mapper.remap(&radial_bump(size, 20.0, 1.5).view());
        let large = mapper.remap(&radial_bump(size, 30.0, 1.5).view());

        let peak_col = |map: &Array2<f64>| {
            map.row(0)
                .iter()
                .enumerate()
                .fold((0usize, f64::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc })
                .0 as f64
        };
        let shift = peak_col(&large) - peak_col(&small);
        let expected = mapper.magnitude * (30.0f64 / 20.0).ln();
        assert!((shift - expected).abs() <= 1.5, "shift {shift}, expected {expected}");
    }

    #[test]
    fn test_outside_source_is_zero() {
        let spectrum = Array2::from_elem((64, 64), 1.0);
        let map = LogPolarMapper::new(64, 64).unwrap().remap(&spectrum.view());
        // The last columns sample radii close to the full width, far outside the array
        assert_eq!(map[[10, 63]], 0.0);
        // Small radii sit well inside
        assert_relative_eq!(map[[10, 0]], 1.0, epsilon = 1e-12);
    }
}
