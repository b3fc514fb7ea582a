//! Fourier-Mellin image registration
//!
//! Estimates the rotation, uniform scale and translation relating two
//! grayscale images of the same shape. Rotation and scale are recovered from
//! log-polar resampled magnitude spectra by phase correlation; translation is
//! recovered by a second phase correlation after undoing them.
//!
//! ```no_run
//! use fourier_mellin::{register, RegistrationConfig};
//! use ndarray::Array2;
//!
//! let reference = Array2::<f64>::zeros((256, 256));
//! let moving = reference.clone();
//! let result = register(&reference.view(), &moving.view(), &RegistrationConfig::default())?;
//! println!("{:?} (confidence {:.3})", result.transform, result.confidence);
//! # Ok::<(), fourier_mellin::RegistrationError>(())
//! ```

pub mod algo;
pub mod config;
pub mod error;
pub mod image_proc;
pub mod transform;

pub use algo::phase_correlation::{phase_correlate, CorrelationResult, PeakRefinement};
pub use algo::registration::{
    register, register_with_diagnostics, Hypothesis, Intermediate, RegistrationResult,
    RotationHypothesis, HYPOTHESIS_TIE_TOLERANCE, LOW_CONFIDENCE,
};
pub use config::RegistrationConfig;
pub use error::RegistrationError;
pub use image_proc::band_mask::BandMask;
pub use image_proc::log_polar::LogPolarMapper;
pub use transform::Transform4Dof;
