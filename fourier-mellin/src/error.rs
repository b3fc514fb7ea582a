//! Error types shared by every stage of the registration pipeline.

use thiserror::Error;

/// Errors that can occur while registering two images.
///
/// Shape and configuration problems are detected before any Fourier work is
/// done, so a returned error never carries a partial result. Numerically
/// degenerate inputs (blank or featureless frames) are not errors; they show
/// up as a low confidence score instead.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Image shapes differ: reference is {reference:?}, moving is {moving:?} (height, width)")]
    InputShape {
        reference: (usize, usize),
        moving: (usize, usize),
    },

    #[error("Invalid image dimensions {height}x{width}: {reason}")]
    InvalidDimensions {
        height: usize,
        width: usize,
        reason: &'static str,
    },

    #[error("Invalid tuning parameter {name} = {value}: must be finite and positive")]
    InvalidTuning { name: &'static str, value: f64 },

    #[error(
        "Band-pass limits are inverted for width {width}: LPmin = {lp_min}, LPmax = {lp_max}. \
         Enlarge lpmax_tuning or reduce lpmin_tuning"
    )]
    Configuration {
        width: usize,
        lp_min: i64,
        lp_max: i64,
    },

    #[error("Transform is not invertible: {0}")]
    InvalidTransform(String),

    #[error("Failed to access configuration file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Check that an image is large enough to be registered.
///
/// The log-polar scale factor divides by `ln(width)`, so a single column
/// cannot be mapped.
pub(crate) fn check_dimensions(height: usize, width: usize) -> Result<()> {
    if height == 0 || width == 0 {
        return Err(RegistrationError::InvalidDimensions {
            height,
            width,
            reason: "image is empty",
        });
    }
    if width < 2 {
        return Err(RegistrationError::InvalidDimensions {
            height,
            width,
            reason: "width must be at least 2 pixels",
        });
    }
    Ok(())
}

/// Check that two arrays share the same `(height, width)`.
pub(crate) fn check_same_shape(reference: (usize, usize), moving: (usize, usize)) -> Result<()> {
    if reference != moving {
        return Err(RegistrationError::InputShape { reference, moving });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_image_rejected() {
        assert!(matches!(
            check_dimensions(0, 16),
            Err(RegistrationError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            check_dimensions(16, 1),
            Err(RegistrationError::InvalidDimensions { .. })
        ));
        assert!(check_dimensions(1, 2).is_ok());
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = check_same_shape((32, 32), (32, 16)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("(32, 32)"));
        assert!(msg.contains("(32, 16)"));
    }
}
