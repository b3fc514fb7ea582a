//! Four degree-of-freedom similarity transform (translation, rotation, uniform scale).
//!
//! Coordinates are pixel coordinates `(x, y)` with `x` along columns and `y`
//! pointing down the rows. A positive angle rotates counterclockwise as the
//! image is displayed.
//!
//! The transform describes how a `moving` image relates to a `reference`:
//! the reference is first translated by `(tx, ty)`, then rotated by `theta`
//! and scaled by `scale` about the image center:
//!
//! ```text
//! q = c + scale * R(theta) * (p + t - c)
//! R(theta) = [ cos  sin ]
//!            [ -sin cos ]
//! ```

use nalgebra::Matrix3;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image_proc::warp::warp_affine;

/// Estimated alignment between two images.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform4Dof {
    /// Translation along x (columns) in pixels, applied before rotation/scale
    pub tx: f64,
    /// Translation along y (rows) in pixels, applied before rotation/scale
    pub ty: f64,
    /// Rotation in degrees, normalized into (-180, 180]
    pub theta_degrees: f64,
    /// Uniform scale factor (> 0)
    pub scale: f64,
}

impl Transform4Dof {
    /// Create a transform, normalizing the angle into (-180, 180]
    pub fn new(tx: f64, ty: f64, theta_degrees: f64, scale: f64) -> Self {
        Self {
            tx,
            ty,
            theta_degrees: normalize_angle_degrees(theta_degrees),
            scale,
        }
    }

    /// Transform that leaves an image unchanged
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation angle in radians
    pub fn theta_radians(&self) -> f64 {
        self.theta_degrees.to_radians()
    }

    /// Forward homogeneous matrix mapping reference pixels to moving pixels.
    pub fn matrix(&self, center: (f64, f64)) -> Matrix3<f64> {
        similarity_matrix(center, self.tx, self.ty, self.theta_radians(), self.scale)
    }

    /// Render `image` through this transform.
    ///
    /// Applying the transform to a reference image produces the moving image
    /// that registration would map back to `self`.
    pub fn apply(&self, image: &ArrayView2<f64>, border_value: f64) -> Result<Array2<f64>> {
        let (height, width) = image.dim();
        warp_affine(image, &self.matrix(image_center(height, width)), border_value)
    }
}

impl Default for Transform4Dof {
    fn default() -> Self {
        Self::identity()
    }
}

/// Geometric center used for rotation, scaling and the log-polar origin.
///
/// For even dimensions this is the pixel that holds DC after a quadrant shift.
pub fn image_center(height: usize, width: usize) -> (f64, f64) {
    ((width / 2) as f64, (height / 2) as f64)
}

/// Wrap an angle in degrees into the half-open range (-180, 180].
pub fn normalize_angle_degrees(theta: f64) -> f64 {
    let mut wrapped = theta % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// Build the forward similarity matrix `q = c + s * R(angle) * (p + t - c)`.
///
/// # Arguments
/// * `center` - Rotation/scale origin as `(x, y)`
/// * `tx`, `ty` - Translation in pixels, applied before rotation and scale
/// * `angle` - Rotation in radians, counterclockwise as displayed
/// * `scale` - Uniform scale factor
pub fn similarity_matrix(center: (f64, f64), tx: f64, ty: f64, angle: f64, scale: f64) -> Matrix3<f64> {
    let (cx, cy) = center;
    let (sin_a, cos_a) = angle.sin_cos();
    let a = scale * cos_a;
    let b = scale * sin_a;

    // Translation column: c + sR(t - c)
    let ux = tx - cx;
    let uy = ty - cy;
    let ox = cx + a * ux + b * uy;
    let oy = cy - b * ux + a * uy;

    Matrix3::new(a, b, ox, -b, a, oy, 0.0, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn map_point(m: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
        let q = m * Vector3::new(x, y, 1.0);
        (q[0], q[1])
    }

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle_degrees(0.0), 0.0);
        assert_relative_eq!(normalize_angle_degrees(180.0), 180.0);
        assert_relative_eq!(normalize_angle_degrees(-180.0), 180.0);
        assert_relative_eq!(normalize_angle_degrees(190.0), -170.0);
        assert_relative_eq!(normalize_angle_degrees(-350.0), 10.0);
        assert_relative_eq!(normalize_angle_degrees(540.0), 180.0);
    }

    #[test]
    fn test_identity_matrix() {
        let m = Transform4Dof::identity().matrix((32.0, 32.0));
        assert_relative_eq!(m, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_center_is_fixed_point_without_translation() {
        let m = similarity_matrix((32.0, 24.0), 0.0, 0.0, 0.7, 1.3);
        let (x, y) = map_point(&m, 32.0, 24.0);
        assert_relative_eq!(x, 32.0, epsilon = 1e-12);
        assert_relative_eq!(y, 24.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quarter_turn_is_counterclockwise_on_screen() {
        // A point to the right of center moves up (smaller y) for +90 degrees
        let t = Transform4Dof::new(0.0, 0.0, 90.0, 1.0);
        let m = t.matrix((0.0, 0.0));
        let (x, y) = map_point(&m, 10.0, 0.0);
        assert_relative_eq!(x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(y, -10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_translation_applied_before_rotation() {
        let t = Transform4Dof::new(5.0, 0.0, 90.0, 2.0);
        let m = t.matrix((0.0, 0.0));
        let (x, y) = map_point(&m, 0.0, 0.0);
        // (0,0) + (5,0) rotated by +90 and scaled by 2
        assert_relative_eq!(x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(y, -10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_image_center() {
        assert_eq!(image_center(64, 128), (64.0, 32.0));
        assert_eq!(image_center(5, 7), (3.0, 2.0));
    }
}
