//! Tuning parameters for the registration pipeline.
//!
//! The configuration is passed explicitly into every registration call so
//! that several configurations can be used concurrently. It serializes to
//! JSON; missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::algo::phase_correlation::PeakRefinement;
use crate::error::{RegistrationError, Result};

/// Registration tuning parameters.
///
/// # Example
/// ```
/// use fourier_mellin::RegistrationConfig;
///
/// let config = RegistrationConfig {
///     lpmax_tuning: 0.9,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.lpmin_tuning, 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Inner edge of the log-polar band, as a fraction of `width / π`
    pub lpmin_tuning: f64,
    /// Outer edge of the log-polar band, as a fraction of the half-width
    pub lpmax_tuning: f64,
    /// Fill value for pixels that warp in from outside the source image
    pub border_value: f64,
    /// Sub-pixel estimator for the rotation/scale correlation
    pub rotation_refinement: PeakRefinement,
    /// Sub-pixel estimator for the translation correlation
    pub translation_refinement: PeakRefinement,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            lpmin_tuning: 0.5,
            lpmax_tuning: 0.8,
            border_value: 0.0,
            rotation_refinement: PeakRefinement::Parabolic,
            translation_refinement: PeakRefinement::Parabolic,
        }
    }
}

impl RegistrationConfig {
    /// Check the values that can be validated without knowing the image size.
    ///
    /// The band limits themselves depend on the image width and are checked
    /// when a [`crate::BandMask`] is built.
    pub fn validate(&self) -> Result<()> {
        check_tuning("lpmin_tuning", self.lpmin_tuning)?;
        check_tuning("lpmax_tuning", self.lpmax_tuning)?;
        if !self.border_value.is_finite() {
            return Err(RegistrationError::InvalidTuning {
                name: "border_value",
                value: self.border_value,
            });
        }
        Ok(())
    }

    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

fn check_tuning(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RegistrationError::InvalidTuning { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistrationConfig::default();
        assert_eq!(config.lpmin_tuning, 0.5);
        assert_eq!(config.lpmax_tuning, 0.8);
        assert_eq!(config.border_value, 0.0);
        assert_eq!(config.rotation_refinement, PeakRefinement::Parabolic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_tuning() {
        let config = RegistrationConfig {
            lpmin_tuning: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RegistrationError::InvalidTuning {
                name: "lpmin_tuning",
                ..
            })
        ));

        let config = RegistrationConfig {
            lpmax_tuning: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RegistrationConfig =
            serde_json::from_str(r#"{ "lpmax_tuning": 0.9, "translation_refinement": "centroid" }"#)
                .unwrap();
        assert_eq!(config.lpmin_tuning, 0.5);
        assert_eq!(config.lpmax_tuning, 0.9);
        assert_eq!(config.translation_refinement, PeakRefinement::Centroid);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registration.json");

        let config = RegistrationConfig {
            lpmin_tuning: 0.4,
            border_value: 0.25,
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = RegistrationConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "lpmin_tuning": -1.0 }"#).unwrap();

        assert!(matches!(
            RegistrationConfig::load_from_file(&path),
            Err(RegistrationError::InvalidTuning { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RegistrationConfig::load_from_file(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(RegistrationError::ConfigIo(_))));
    }
}
