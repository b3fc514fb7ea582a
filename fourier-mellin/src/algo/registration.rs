//! Rotation, scale and translation registration of two grayscale images.
//!
//! # Algorithm
//!
//! 1. Both images are windowed and reduced to centered log-magnitude spectra.
//!    Magnitude spectra ignore translation, leaving only rotation and scale.
//! 2. The spectra are resampled to log-polar coordinates, where rotation and
//!    scale become shifts along the angle and log-radius axes.
//! 3. An annular band-pass mask keeps the informative mid frequencies.
//! 4. Phase correlation of the masked maps yields the angle and log-radius shifts.
//! 5. Magnitude spectra are point-symmetric, so a rotation `θ` and `θ + 180°`
//!    produce the same log-polar map. Both hypotheses are tested by warping
//!    the moving image back through each and phase-correlating it against the
//!    reference in the pixel domain.
//! 6. The hypothesis with the sharper translation peak wins; its translation
//!    completes the estimate and its peak becomes the confidence.
//!
//! The two image branches and the two hypotheses are independent and run in
//! parallel on the rayon pool.

use log::{debug, info, warn};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::algo::phase_correlation::{phase_correlate, CorrelationResult};
use crate::config::RegistrationConfig;
use crate::error::{check_dimensions, check_same_shape, Result};
use crate::image_proc::band_mask::BandMask;
use crate::image_proc::log_polar::LogPolarMapper;
use crate::image_proc::spectrum::log_magnitude_spectrum;
use crate::image_proc::warp::warp_4dof;
use crate::transform::{normalize_angle_degrees, Transform4Dof};

/// Confidence below which a result is logged as unreliable.
pub const LOW_CONFIDENCE: f64 = 0.05;

/// Peak scores closer than this are a tie, which the primary hypothesis wins.
///
/// Scenes that are unchanged by a half turn score both hypotheses equally up
/// to rounding noise.
pub const HYPOTHESIS_TIE_TOLERANCE: f64 = 1e-6;

/// Named intermediate arrays offered to a diagnostics callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intermediate {
    ReferenceSpectrum,
    MovingSpectrum,
    ReferenceLogPolar,
    MovingLogPolar,
    ReferenceMasked,
    MovingMasked,
    PrimaryCandidate,
    FlippedCandidate,
}

impl Intermediate {
    /// Stable snake_case name, suitable for file names
    pub fn name(&self) -> &'static str {
        match self {
            Intermediate::ReferenceSpectrum => "reference_spectrum",
            Intermediate::MovingSpectrum => "moving_spectrum",
            Intermediate::ReferenceLogPolar => "reference_log_polar",
            Intermediate::MovingLogPolar => "moving_log_polar",
            Intermediate::ReferenceMasked => "reference_masked",
            Intermediate::MovingMasked => "moving_masked",
            Intermediate::PrimaryCandidate => "primary_candidate",
            Intermediate::FlippedCandidate => "flipped_candidate",
        }
    }
}

/// The two rotation hypotheses left open by the log-polar estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationHypothesis {
    /// The angle read directly from the log-polar correlation
    Primary,
    /// The same angle plus 180 degrees
    Flipped,
}

/// One scored rotation hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub kind: RotationHypothesis,
    /// Rotation applied to the moving image to undo the estimated rotation, in degrees
    pub correction_degrees: f64,
    /// Translation found after the correction, with its peak score
    pub translation: CorrelationResult,
}

/// Full output of a registration call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegistrationResult {
    /// Transform mapping the reference onto the moving image
    pub transform: Transform4Dof,
    /// Peak score of the winning hypothesis in [0, 1]
    pub confidence: f64,
    /// Raw correlation of the masked log-polar maps (rows = angle, cols = log-radius)
    pub rotation_scale: CorrelationResult,
    /// Primary and flipped hypotheses, in that order
    pub hypotheses: [Hypothesis; 2],
    /// Which hypothesis was selected
    pub chosen: RotationHypothesis,
}

impl RegistrationResult {
    /// The selected hypothesis
    pub fn chosen_hypothesis(&self) -> &Hypothesis {
        match self.chosen {
            RotationHypothesis::Primary => &self.hypotheses[0],
            RotationHypothesis::Flipped => &self.hypotheses[1],
        }
    }

    /// The rejected hypothesis
    pub fn rejected_hypothesis(&self) -> &Hypothesis {
        match self.chosen {
            RotationHypothesis::Primary => &self.hypotheses[1],
            RotationHypothesis::Flipped => &self.hypotheses[0],
        }
    }
}

/// Register `moving` against `reference`.
///
/// # Arguments
/// * `reference` - Reference image, shape `(height, width)`
/// * `moving` - Image to align, same shape as `reference`
/// * `config` - Band-pass tuning and sub-pixel options
///
/// # Returns
/// * `RegistrationResult` whose `transform` maps `reference` onto `moving`
///
/// # Errors
/// * `RegistrationError::InputShape` - shapes differ
/// * `RegistrationError::InvalidDimensions` - empty image or width below 2
/// * `RegistrationError::InvalidTuning` / `RegistrationError::Configuration` - bad band limits
///
/// All errors are raised before any transform is computed.
///
/// # Example
/// ```
/// use fourier_mellin::{register, RegistrationConfig, Transform4Dof};
/// use fourier_mellin::image_proc::test_patterns::blob_field;
///
/// let reference = blob_field(128, 128, 40, 3);
/// let truth = Transform4Dof::new(4.0, -3.0, 20.0, 1.0);
/// let moving = truth.apply(&reference.view(), 0.0).unwrap();
///
/// let result = register(&reference.view(), &moving.view(), &RegistrationConfig::default()).unwrap();
/// assert!((result.transform.theta_degrees - 20.0).abs() < 2.0);
/// assert!((result.transform.tx - 4.0).abs() < 1.0);
/// ```
pub fn register(
    reference: &ArrayView2<f64>,
    moving: &ArrayView2<f64>,
    config: &RegistrationConfig,
) -> Result<RegistrationResult> {
    register_with_diagnostics(reference, moving, config, |_, _| {})
}

/// Same as [`register`], handing every named intermediate to `on_intermediate`.
///
/// The callback runs on the calling thread after each parallel stage, in a
/// fixed order, and never influences the result.
pub fn register_with_diagnostics<F>(
    reference: &ArrayView2<f64>,
    moving: &ArrayView2<f64>,
    config: &RegistrationConfig,
    mut on_intermediate: F,
) -> Result<RegistrationResult>
where
    F: FnMut(Intermediate, ArrayView2<f64>),
{
    check_same_shape(reference.dim(), moving.dim())?;
    let (height, width) = reference.dim();
    check_dimensions(height, width)?;

    let mapper = LogPolarMapper::new(height, width)?;
    let mask = BandMask::new(&mapper, config)?;
    debug!(
        "Registering {}x{} images, log-polar magnitude {:.3}, band columns {}..{} ({} kept)",
        width,
        height,
        mapper.magnitude,
        mask.lp_min,
        mask.lp_max,
        mask.band_width()
    );

    // Spectral preprocessing, log-polar remap and masking for both images
    let branch = |image: &ArrayView2<f64>| -> Result<(Array2<f64>, Array2<f64>, Array2<f64>)> {
        let spectrum = log_magnitude_spectrum(image)?;
        let log_polar = mapper.remap(&spectrum.view());
        let masked = mask.apply(&log_polar.view());
        Ok((spectrum, log_polar, masked))
    };
    let (ref_branch, mov_branch) = rayon::join(|| branch(reference), || branch(moving));
    let (ref_spectrum, ref_log_polar, ref_masked) = ref_branch?;
    let (mov_spectrum, mov_log_polar, mov_masked) = mov_branch?;

    on_intermediate(Intermediate::ReferenceSpectrum, ref_spectrum.view());
    on_intermediate(Intermediate::MovingSpectrum, mov_spectrum.view());
    on_intermediate(Intermediate::ReferenceLogPolar, ref_log_polar.view());
    on_intermediate(Intermediate::MovingLogPolar, mov_log_polar.view());
    on_intermediate(Intermediate::ReferenceMasked, ref_masked.view());
    on_intermediate(Intermediate::MovingMasked, mov_masked.view());

    // Rotation and scale
    let rotation_scale = phase_correlate(
        &ref_masked.view(),
        &mov_masked.view(),
        config.rotation_refinement,
    )?;
    let theta_primary = mapper.angle_degrees(rotation_scale.dy);
    let theta_flipped = theta_primary + 180.0;
    let scale_inv = mapper.scale_factor(rotation_scale.dx);
    debug!(
        "Log-polar shift ({:.3} cols, {:.3} rows), peak {:.4}: correction {:.3} deg, scale {:.5}",
        rotation_scale.dx, rotation_scale.dy, rotation_scale.peak, theta_primary, scale_inv
    );

    // Undo rotation/scale under each hypothesis, then measure translation
    let evaluate = |kind: RotationHypothesis,
                    correction_degrees: f64|
     -> Result<(Hypothesis, Array2<f64>)> {
        let candidate = warp_4dof(
            moving,
            0.0,
            0.0,
            correction_degrees.to_radians(),
            scale_inv,
            config.border_value,
        )?;
        let translation =
            phase_correlate(reference, &candidate.view(), config.translation_refinement)?;
        Ok((
            Hypothesis {
                kind,
                correction_degrees,
                translation,
            },
            candidate,
        ))
    };
    let (primary, flipped) = rayon::join(
        || evaluate(RotationHypothesis::Primary, theta_primary),
        || evaluate(RotationHypothesis::Flipped, theta_flipped),
    );
    let (primary, primary_candidate) = primary?;
    let (flipped, flipped_candidate) = flipped?;

    on_intermediate(Intermediate::PrimaryCandidate, primary_candidate.view());
    on_intermediate(Intermediate::FlippedCandidate, flipped_candidate.view());

    debug!(
        "Hypothesis peaks: primary {:.4} at ({:.3}, {:.3}), flipped {:.4} at ({:.3}, {:.3})",
        primary.translation.peak,
        primary.translation.dx,
        primary.translation.dy,
        flipped.translation.peak,
        flipped.translation.dx,
        flipped.translation.dy
    );

    let winner = if flipped.translation.peak - primary.translation.peak > HYPOTHESIS_TIE_TOLERANCE {
        flipped
    } else {
        primary
    };

    let transform = Transform4Dof {
        tx: winner.translation.dx,
        ty: winner.translation.dy,
        theta_degrees: normalize_angle_degrees(-winner.correction_degrees),
        scale: 1.0 / scale_inv,
    };
    let confidence = winner.translation.peak;

    info!(
        "Registration: tx {:.3}, ty {:.3}, theta {:.3} deg, scale {:.5}, confidence {:.4}",
        transform.tx, transform.ty, transform.theta_degrees, transform.scale, confidence
    );
    if confidence < LOW_CONFIDENCE {
        warn!(
            "Registration confidence {:.4} is below {:.2}; inputs may lack structure",
            confidence, LOW_CONFIDENCE
        );
    }

    Ok(RegistrationResult {
        transform,
        confidence,
        rotation_scale,
        hypotheses: [primary, flipped],
        chosen: winner.kind,
    })
}
