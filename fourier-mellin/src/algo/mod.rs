//! Correlation and registration algorithms
//!
//! Phase correlation with sub-pixel peak refinement, and the Fourier-Mellin
//! pipeline built on top of it.

pub mod phase_correlation;
pub mod registration;

pub use phase_correlation::{phase_correlate, CorrelationResult, PeakRefinement};
pub use registration::{register, register_with_diagnostics, RegistrationResult};
