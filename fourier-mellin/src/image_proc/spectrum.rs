//! Windowed log-magnitude spectra.

use ndarray::{Array2, ArrayView2};

use crate::error::{check_dimensions, Result};
use crate::image_proc::fft::{fftshift, Fft2d};
use crate::image_proc::window::apply_hann;

/// Compute the quadrant-shifted log-magnitude spectrum of an image.
///
/// The image is multiplied by a Hann window of its own size, transformed,
/// and mapped through `ln(|G| + 1)`. The `+1` keeps zero-magnitude bins finite.
/// DC ends up at index `(height / 2, width / 2)`, which is the origin the
/// log-polar resampler expects.
pub fn log_magnitude_spectrum(image: &ArrayView2<f64>) -> Result<Array2<f64>> {
    let (height, width) = image.dim();
    check_dimensions(height, width)?;

    let fft = Fft2d::new(height, width);
    let windowed = apply_hann(image);
    let spectrum = fft.forward_real(&windowed.view());
    let log_mag = spectrum.mapv(|g| (g.norm() + 1.0).ln());

    Ok(fftshift(&log_mag.view()))
}
