//! Bilinear sampling of 2-D arrays at fractional coordinates.

use ndarray::ArrayView2;

/// Sample `data` at the fractional position `(x, y)` with bilinear interpolation.
///
/// `x` indexes columns and `y` indexes rows. Each of the four neighbours
/// that falls outside the array contributes `border` instead of a pixel
/// value, so samples fade smoothly into the border near the edges.
///
/// # Examples
/// ```
/// use fourier_mellin::image_proc::interp::bilinear_sample;
/// use ndarray::array;
///
/// let data = array![[0.0, 1.0], [2.0, 3.0]];
/// assert_eq!(bilinear_sample(&data.view(), 0.5, 0.5, 0.0), 1.5);
/// assert_eq!(bilinear_sample(&data.view(), 1.0, 0.0, 0.0), 1.0);
/// ```
pub fn bilinear_sample(data: &ArrayView2<f64>, x: f64, y: f64, border: f64) -> f64 {
    if !x.is_finite() || !y.is_finite() {
        return border;
    }

    let (height, width) = data.dim();
    let x0 = x.floor();
    let y0 = y.floor();

    // Entirely outside the one-pixel fringe where interpolation can still touch data
    if x0 < -1.0 || y0 < -1.0 || x0 >= width as f64 || y0 >= height as f64 {
        return border;
    }

    let fx = x - x0;
    let fy = y - y0;
    let xi = x0 as i64;
    let yi = y0 as i64;

    let pixel = |row: i64, col: i64| -> f64 {
        if row < 0 || col < 0 || row >= height as i64 || col >= width as i64 {
            border
        } else {
            data[[row as usize, col as usize]]
        }
    };

    let top = pixel(yi, xi) * (1.0 - fx) + pixel(yi, xi + 1) * fx;
    let bottom = pixel(yi + 1, xi) * (1.0 - fx) + pixel(yi + 1, xi + 1) * fx;
    top * (1.0 - fy) + bottom * fy
}
