//! Phase-only correlation with sub-pixel peak localization.
//!
//! The normalized cross-power spectrum of two signals keeps only their
//! relative phase, so its inverse transform is (ideally) a single delta at
//! the displacement between them. The integer peak is then refined to
//! sub-pixel precision from its immediate neighbourhood.
//!
//! # Conventions
//!
//! For `phase_correlate(a, b)` the reported `(dx, dy)` is the displacement of
//! `b` relative to `a`, i.e. `b(x, y) ≈ a(x - dx, y - dy)`. Offsets wrap
//! modulo the array size into `[-N/2, N/2)`, so a peak near the far edge
//! reads as a negative shift.

use ndarray::{Array2, ArrayView2, Zip};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{check_dimensions, check_same_shape, Result};
use crate::image_proc::fft::Fft2d;

/// Cross-power elements smaller than this fraction of the largest element are
/// zeroed instead of normalized.
///
/// `|G_a * conj(G_b)|` scales with the square of the pixel intensity, so the
/// cut is relative. Rounding noise in an empty bin sits near `1e-32` of the
/// maximum; genuinely weak frequencies sit many orders above the cut.
pub const CROSS_POWER_EPSILON: f64 = 1e-24;

/// Sub-pixel estimator applied around the integer correlation peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakRefinement {
    /// Independent three-point parabola along each axis (3x3 score window).
    ///
    /// Tolerates the lopsided peaks produced by log-polar maps.
    Parabolic,
    /// Intensity-weighted centroid over a 5x5 window (5x5 score window).
    Centroid,
}

impl PeakRefinement {
    fn radius(self) -> usize {
        match self {
            PeakRefinement::Parabolic => 1,
            PeakRefinement::Centroid => 2,
        }
    }
}

/// Displacement and peak sharpness from one correlation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Sub-pixel displacement along columns
    pub dx: f64,
    /// Sub-pixel displacement along rows
    pub dy: f64,
    /// Peak score in [0, 1]; 1 for a perfect match
    pub peak: f64,
}

/// Phase-correlate two real arrays of identical shape.
///
/// # Arguments
/// * `a` - Reference signal
/// * `b` - Displaced signal
/// * `refinement` - Sub-pixel estimator
///
/// # Returns
/// * `CorrelationResult` with the displacement of `b` relative to `a`
///
/// # Errors
/// * `RegistrationError::InputShape` - `a` and `b` differ in shape
/// * `RegistrationError::InvalidDimensions` - the arrays are empty
///
/// # Example
/// ```
/// use fourier_mellin::algo::phase_correlation::{phase_correlate, PeakRefinement};
/// use fourier_mellin::image_proc::test_patterns::{blob_field, circular_shift};
///
/// let a = blob_field(64, 64, 20, 1);
/// let b = circular_shift(&a.view(), 5, -3);
/// let result = phase_correlate(&a.view(), &b.view(), PeakRefinement::Parabolic).unwrap();
/// assert!((result.dx - 5.0).abs() < 1e-6);
/// assert!((result.dy + 3.0).abs() < 1e-6);
/// assert!(result.peak > 0.99);
/// ```
pub fn phase_correlate(
    a: &ArrayView2<f64>,
    b: &ArrayView2<f64>,
    refinement: PeakRefinement,
) -> Result<CorrelationResult> {
    check_same_shape(a.dim(), b.dim())?;
    let (height, width) = a.dim();
    check_dimensions(height, width)?;

    let fft = Fft2d::new(height, width);
    let ga = fft.forward_real(a);
    let gb = fft.forward_real(b);

    let cross = normalized_cross_power(&ga, &gb);
    let surface = fft.inverse(cross).mapv(|v| v.re);

    Ok(locate_peak(&surface.view(), refinement))
}

/// `G_a * conj(G_b) / |G_a * conj(G_b)|`, with near-zero elements clamped to zero.
///
/// An element counts as near-zero when its magnitude is at most
/// [`CROSS_POWER_EPSILON`] times the largest magnitude, so the result does not
/// depend on the intensity scale of the inputs. All-zero inputs give an
/// all-zero cross power.
pub fn normalized_cross_power(ga: &Array2<Complex64>, gb: &Array2<Complex64>) -> Array2<Complex64> {
    let mut cross = Array2::<Complex64>::zeros(ga.dim());
    Zip::from(&mut cross)
        .and(ga)
        .and(gb)
        .for_each(|out, &a, &b| *out = a * b.conj());

    let max_magnitude = cross.iter().fold(0.0f64, |m, v| m.max(v.norm()));
    let threshold = CROSS_POWER_EPSILON * max_magnitude;

    cross.mapv_inplace(|product| {
        let magnitude = product.norm();
        if magnitude > threshold {
            product / magnitude
        } else {
            Complex64::new(0.0, 0.0)
        }
    });
    cross
}

/// Find and refine the global maximum of a correlation surface.
///
/// The surface is `ifft(G_a * conj(G_b))`, whose peak sits at minus the
/// displacement of `b`; the returned offsets are negated accordingly.
pub fn locate_peak(surface: &ArrayView2<f64>, refinement: PeakRefinement) -> CorrelationResult {
    let (height, width) = surface.dim();

    let (peak_row, peak_col, _) = surface.indexed_iter().fold(
        (0, 0, f64::NEG_INFINITY),
        |best, ((r, c), &v)| if v > best.2 { (r, c, v) } else { best },
    );

    let (sub_row, sub_col) = match refinement {
        PeakRefinement::Parabolic => refine_parabolic(surface, peak_row, peak_col),
        PeakRefinement::Centroid => refine_centroid(surface, peak_row, peak_col),
    };

    let peak = window_sum(surface, peak_row, peak_col, refinement.radius()).clamp(0.0, 1.0);

    CorrelationResult {
        dx: -wrap_offset(peak_col as f64 + sub_col, width),
        dy: -wrap_offset(peak_row as f64 + sub_row, height),
        peak,
    }
}

/// Map a peak position onto the signed range `(-N/2, N/2]`.
fn wrap_offset(position: f64, n: usize) -> f64 {
    let n = n as f64;
    if position > n / 2.0 {
        position - n
    } else {
        position
    }
}

fn wrapped(index: usize, delta: isize, n: usize) -> usize {
    (index as isize + delta).rem_euclid(n as isize) as usize
}

/// Vertex of the parabola through three equally spaced samples, relative to the middle.
fn parabola_vertex(prev: f64, curr: f64, next: f64) -> f64 {
    let denom = prev - 2.0 * curr + next;
    if denom.abs() > 1e-12 {
        (0.5 * (prev - next) / denom).clamp(-0.5, 0.5)
    } else {
        0.0
    }
}

/// Independent three-point parabolic fit along each axis, neighbours wrapped.
pub fn refine_parabolic(surface: &ArrayView2<f64>, row: usize, col: usize) -> (f64, f64) {
    let (height, width) = surface.dim();
    let curr = surface[[row, col]];

    let d_row = if height >= 3 {
        parabola_vertex(
            surface[[wrapped(row, -1, height), col]],
            curr,
            surface[[wrapped(row, 1, height), col]],
        )
    } else {
        0.0
    };

    let d_col = if width >= 3 {
        parabola_vertex(
            surface[[row, wrapped(col, -1, width)]],
            curr,
            surface[[row, wrapped(col, 1, width)]],
        )
    } else {
        0.0
    };

    (d_row, d_col)
}

/// Intensity-weighted centroid over a wrapped 5x5 window.
///
/// Negative side lobes are ignored so they cannot drag the centroid outward.
pub fn refine_centroid(surface: &ArrayView2<f64>, row: usize, col: usize) -> (f64, f64) {
    let (height, width) = surface.dim();
    let radius = PeakRefinement::Centroid.radius() as isize;

    let mut total = 0.0;
    let mut sum_row = 0.0;
    let mut sum_col = 0.0;
    for dr in -radius..=radius {
        for dc in -radius..=radius {
            let v = surface[[wrapped(row, dr, height), wrapped(col, dc, width)]].max(0.0);
            total += v;
            sum_row += v * dr as f64;
            sum_col += v * dc as f64;
        }
    }

    if total > 0.0 {
        (sum_row / total, sum_col / total)
    } else {
        (0.0, 0.0)
    }
}

/// Sum of the surface over a wrapped square window around the peak.
///
/// Windows wider than the array are truncated so no element is counted twice.
fn window_sum(surface: &ArrayView2<f64>, row: usize, col: usize, radius: usize) -> f64 {
    let (height, width) = surface.dim();
    let span = |n: usize| -> (isize, isize) {
        let r = radius.min((n - 1) / 2) as isize;
        (-r, r)
    };
    let (r_lo, r_hi) = span(height);
    let (c_lo, c_hi) = span(width);

    let mut sum = 0.0;
    for dr in r_lo..=r_hi {
        for dc in c_lo..=c_hi {
            sum += surface[[wrapped(row, dr, height), wrapped(col, dc, width)]];
        }
    }
    sum
}
