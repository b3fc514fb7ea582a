//! Affine warping of raster images by inverse mapping.

use nalgebra::{Matrix3, Vector3};
use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{RegistrationError, Result};
use crate::image_proc::interp::bilinear_sample;
use crate::transform::{image_center, similarity_matrix};

/// Warp `image` through a forward affine matrix.
///
/// `forward` maps source pixel coordinates `(x, y, 1)` to destination
/// coordinates. Each destination pixel is pulled back through the inverse
/// matrix and bilinearly sampled. Samples falling outside the source take
/// `border_value`. The output has the same shape as the input.
///
/// # Errors
/// * `RegistrationError::InvalidTransform` - the matrix cannot be inverted
pub fn warp_affine(
    image: &ArrayView2<f64>,
    forward: &Matrix3<f64>,
    border_value: f64,
) -> Result<Array2<f64>> {
    let inverse = forward
        .try_inverse()
        .filter(|m| m.iter().all(|v| v.is_finite()))
        .ok_or_else(|| RegistrationError::InvalidTransform(format!("{forward}")))?;

    let mut out = Array2::<f64>::zeros(image.dim());
    Zip::indexed(&mut out).par_for_each(|(row, col), value| {
        let src = inverse * Vector3::new(col as f64, row as f64, 1.0);
        *value = bilinear_sample(image, src[0], src[1], border_value);
    });

    Ok(out)
}

/// Rotate, scale and translate an image about its center.
///
/// The content is translated by `(tx, ty)`, then rotated counterclockwise
/// (as displayed) by `angle` radians and scaled by `scale` about
/// `(width / 2, height / 2)`.
///
/// # Errors
/// * `RegistrationError::InvalidTransform` - `scale` is zero or not finite
pub fn warp_4dof(
    image: &ArrayView2<f64>,
    tx: f64,
    ty: f64,
    angle: f64,
    scale: f64,
    border_value: f64,
) -> Result<Array2<f64>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RegistrationError::InvalidTransform(format!(
            "scale must be finite and positive, got {scale}"
        )));
    }
    let (height, width) = image.dim();
    let forward = similarity_matrix(image_center(height, width), tx, ty, angle, scale);
    warp_affine(image, &forward, border_value)
}
