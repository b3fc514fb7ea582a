//! Annular band-pass mask over the log-radius axis of a log-polar map.
//!
//! Low radii are dominated by DC and the window's own spectrum, high radii by
//! noise and aliasing. Only the band between `lp_min` and `lp_max` columns is
//! kept for rotation/scale matching.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use std::f64::consts::PI;

use crate::config::RegistrationConfig;
use crate::error::{RegistrationError, Result};
use crate::image_proc::log_polar::LogPolarMapper;

/// Column profile of the annulus, broadcast over every angle row.
#[derive(Debug, Clone, PartialEq)]
pub struct BandMask {
    /// Inner band limit in log-radius columns
    pub lp_min: i64,
    /// Outer band limit in log-radius columns
    pub lp_max: i64,
    profile: Array1<f64>,
}

impl BandMask {
    /// Derive the band limits for `mapper` from the tuning fractions.
    ///
    /// ```text
    /// lp_min = floor(M * ln(lpmin_tuning * width / 2π))
    /// lp_max = min(width, floor(M * ln(width * lpmax_tuning / 2)))
    /// ```
    ///
    /// Columns `lp_min - 1 ..= lp_max - 1` are kept (clamped to the map).
    ///
    /// # Errors
    /// * `RegistrationError::InvalidTuning` - a tuning fraction is not finite and positive
    /// * `RegistrationError::Configuration` - `lp_max <= lp_min`, or the band misses the map
    pub fn new(mapper: &LogPolarMapper, config: &RegistrationConfig) -> Result<Self> {
        config.validate()?;

        let width = mapper.width;
        let w = width as f64;
        let lp_min = (mapper.magnitude * (config.lpmin_tuning * w / (2.0 * PI)).ln()).floor() as i64;
        let lp_max = ((mapper.magnitude * (w * config.lpmax_tuning / 2.0).ln()).floor() as i64)
            .min(width as i64);

        let start = (lp_min - 1).max(0);
        let stop = lp_max.max(0);
        if lp_max <= lp_min || stop <= start {
            return Err(RegistrationError::Configuration {
                width,
                lp_min,
                lp_max,
            });
        }

        let profile = Array1::from_shape_fn(width, |col| {
            let col = col as i64;
            if col >= start && col < stop {
                1.0
            } else {
                0.0
            }
        });

        Ok(Self {
            lp_min,
            lp_max,
            profile,
        })
    }

    /// Per-column weights (0 outside the band, 1 inside)
    pub fn profile(&self) -> &Array1<f64> {
        &self.profile
    }

    /// Number of columns kept by the mask
    pub fn band_width(&self) -> usize {
        self.profile.iter().filter(|&&v| v > 0.0).count()
    }

    /// Multiply every angle row of `map` by the column profile.
    pub fn apply(&self, map: &ArrayView2<f64>) -> Array2<f64> {
        debug_assert_eq!(map.len_of(Axis(1)), self.profile.len());
        let mut masked = map.to_owned();
        masked *= &self.profile;
        masked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mapper(size: usize) -> LogPolarMapper {
        LogPolarMapper::new(size, size).unwrap()
    }

    #[test]
    fn test_default_limits_for_128() {
        let m = mapper(128);
        let mask = BandMask::new(&m, &RegistrationConfig::default()).unwrap();

        let mag = 128.0 / 128f64.ln();
        let expected_min = (mag * (0.5 * 128.0 / (2.0 * PI)).ln()).floor() as i64;
        let expected_max = (mag * (128.0 * 0.8 / 2.0f64).ln()).floor() as i64;
        assert_eq!(mask.lp_min, expected_min);
        assert_eq!(mask.lp_max, expected_max);
        assert_eq!(mask.lp_min, 61);
        assert_eq!(mask.lp_max, 103);
        assert_eq!(mask.band_width() as i64, mask.lp_max - mask.lp_min + 1);
    }

    #[test]
    fn test_profile_edges() {
        let m = mapper(128);
        let mask = BandMask::new(&m, &RegistrationConfig::default()).unwrap();
        let p = mask.profile();
        let first = (mask.lp_min - 1) as usize;
        let last = (mask.lp_max - 1) as usize;
        assert_eq!(p[first - 1], 0.0);
        assert_eq!(p[first], 1.0);
        assert_eq!(p[last], 1.0);
        assert_eq!(p[last + 1], 0.0);
    }

    #[test]
    fn test_apply_broadcasts_over_rows() {
        let m = mapper(64);
        let mask = BandMask::new(&m, &RegistrationConfig::default()).unwrap();
        let map = Array2::from_elem((64, 64), 2.0);
        let masked = mask.apply(&map.view());
        for row in masked.rows() {
            for (v, w) in row.iter().zip(mask.profile().iter()) {
                assert_relative_eq!(*v, 2.0 * w);
            }
        }
    }

    #[test]
    fn test_inverted_tuning_rejected() {
        let m = mapper(128);
        let config = RegistrationConfig {
            lpmin_tuning: 2.0,
            lpmax_tuning: 0.2,
            ..Default::default()
        };
        let err = BandMask::new(&m, &config).unwrap_err();
        match err {
            RegistrationError::Configuration { lp_min, lp_max, .. } => assert!(lp_max <= lp_min),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_lp_max_clamped_to_width() {
        let m = mapper(64);
        let config = RegistrationConfig {
            lpmax_tuning: 50.0,
            ..Default::default()
        };
        let mask = BandMask::new(&m, &config).unwrap();
        assert_eq!(mask.lp_max, 64);
        assert_eq!(mask.profile()[63], 1.0);
    }

    #[test]
    fn test_invalid_tuning_value() {
        let m = mapper(64);
        let config = RegistrationConfig {
            lpmin_tuning: -0.5,
            ..Default::default()
        };
        assert!(matches!(
            BandMask::new(&m, &config),
            Err(RegistrationError::InvalidTuning { .. })
        ));
    }
}
