//! Image processing building blocks for registration
//!
//! Windowing, 2-D FFTs, spectra, log-polar resampling, band masking and
//! geometric warping, plus conversions to and from the image crate and
//! synthetic test scenes.

pub mod band_mask;
pub mod fft;
pub mod image;
pub mod interp;
pub mod log_polar;
pub mod spectrum;
pub mod test_patterns;
pub mod warp;
pub mod window;

pub use band_mask::BandMask;
pub use image::{array2_to_gray_image, dynamic_image_to_array2};
pub use log_polar::LogPolarMapper;
pub use spectrum::log_magnitude_spectrum;
pub use warp::{warp_4dof, warp_affine};
pub use window::{apply_hann, hann_window};
