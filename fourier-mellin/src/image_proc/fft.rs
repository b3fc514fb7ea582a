//! Two-dimensional FFTs over ndarray buffers using rustfft.
//!
//! Transforms are computed row-wise then column-wise. The inverse transform
//! is normalized by `1 / (height * width)` so that `inverse(forward(x)) == x`.

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Planned forward and inverse 2-D transforms for one array shape.
pub struct Fft2d {
    height: usize,
    width: usize,
    row_forward: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl Fft2d {
    /// Plan transforms for arrays of shape `(height, width)`.
    pub fn new(height: usize, width: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            height,
            width,
            row_forward: planner.plan_fft_forward(width),
            col_forward: planner.plan_fft_forward(height),
            row_inverse: planner.plan_fft_inverse(width),
            col_inverse: planner.plan_fft_inverse(height),
        }
    }

    /// Shape `(height, width)` this plan was built for
    pub fn dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Forward transform of a real-valued array.
    pub fn forward_real(&self, input: &ArrayView2<f64>) -> Array2<Complex64> {
        debug_assert_eq!(input.dim(), self.dim());
        let data = input.mapv(|v| Complex64::new(v, 0.0));
        self.forward(data)
    }

    /// Forward transform, consuming the input buffer.
    pub fn forward(&self, data: Array2<Complex64>) -> Array2<Complex64> {
        transform_2d(data, &self.row_forward, &self.col_forward)
    }

    /// Normalized inverse transform, consuming the input buffer.
    pub fn inverse(&self, data: Array2<Complex64>) -> Array2<Complex64> {
        let scale = 1.0 / (self.height * self.width) as f64;
        let mut out = transform_2d(data, &self.row_inverse, &self.col_inverse);
        out.mapv_inplace(|v| v * scale);
        out
    }
}

fn transform_2d(
    mut data: Array2<Complex64>,
    row_fft: &Arc<dyn Fft<f64>>,
    col_fft: &Arc<dyn Fft<f64>>,
) -> Array2<Complex64> {
    let (height, width) = data.dim();
    let mut buffer = Vec::with_capacity(height.max(width));

    for mut row in data.rows_mut() {
        buffer.clear();
        buffer.extend(row.iter().copied());
        row_fft.process(&mut buffer);
        row.iter_mut().zip(&buffer).for_each(|(dst, src)| *dst = *src);
    }

    for mut col in data.columns_mut() {
        buffer.clear();
        buffer.extend(col.iter().copied());
        col_fft.process(&mut buffer);
        col.iter_mut().zip(&buffer).for_each(|(dst, src)| *dst = *src);
    }

    data
}

/// Move the zero-frequency element to index `(height / 2, width / 2)`.
///
/// Matches the usual `fftshift` convention for both odd and even sizes.
pub fn fftshift<T: Copy>(data: &ArrayView2<T>) -> Array2<T> {
    let (height, width) = data.dim();
    let (hr, hc) = (height / 2, width / 2);
    Array2::from_shape_fn((height, width), |(r, c)| {
        data[[(r + height - hr) % height, (c + width - hc) % width]]
    })
}
