//! Synthetic scenes for exercising the registration pipeline.
//!
//! All generators are seeded so that tests and demos are reproducible.

use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

/// Fraction of the shorter image side that bounds the blob disc radius.
const BLOB_DISC_FRACTION: f64 = 0.3;

/// Render a field of Gaussian blobs on a zero background.
///
/// Blob centers are drawn uniformly inside a disc of radius
/// `0.3 * min(height, width)` around the image center, so the content survives
/// rotation about the center and scaling up to about 1.6x without touching
/// the border. Widths and amplitudes vary per blob so the field has no
/// rotational symmetry.
///
/// # Arguments
/// * `height`, `width` - Output dimensions
/// * `count` - Number of blobs
/// * `seed` - RNG seed
pub fn blob_field(height: usize, width: usize, count: usize, seed: u64) -> Array2<f64> {
    render_blobs(height, width, count, seed, false)
}

/// Like [`blob_field`], but every blob has a twin reflected through the center.
///
/// The scene is unchanged by a half turn about `(width / 2, height / 2)`, so
/// the two rotation hypotheses of a registration are equally good for it.
pub fn symmetric_blob_field(height: usize, width: usize, pairs: usize, seed: u64) -> Array2<f64> {
    render_blobs(height, width, pairs, seed, true)
}

fn render_blobs(height: usize, width: usize, count: usize, seed: u64, mirrored: bool) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut field = Array2::<f64>::zeros((height, width));

    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;
    let disc = BLOB_DISC_FRACTION * height.min(width) as f64;

    for _ in 0..count {
        // sqrt for uniform density over the disc area
        let r = disc * rng.random::<f64>().sqrt();
        let phi = rng.random_range(0.0..2.0 * PI);
        let ox = r * phi.cos();
        let oy = r * phi.sin();
        let sigma = rng.random_range(1.2..2.5);
        let amplitude = rng.random_range(0.3..1.0);
        add_gaussian(&mut field, cx + ox, cy + oy, sigma, amplitude);
        if mirrored {
            add_gaussian(&mut field, cx - ox, cy - oy, sigma, amplitude);
        }
    }

    field
}

/// Add a circular Gaussian spot to `field`, cut off at a radius of four sigma.
pub fn add_gaussian(field: &mut Array2<f64>, x0: f64, y0: f64, sigma: f64, amplitude: f64) {
    let (height, width) = field.dim();
    let cutoff = 4.0 * sigma;
    let cutoff_sq = cutoff * cutoff;
    let inv_two_sigma2 = 1.0 / (2.0 * sigma * sigma);

    let row_min = (y0 - cutoff).floor().max(0.0) as usize;
    let row_max = ((y0 + cutoff).ceil().max(-1.0) + 1.0) as usize;
    let col_min = (x0 - cutoff).floor().max(0.0) as usize;
    let col_max = ((x0 + cutoff).ceil().max(-1.0) + 1.0) as usize;

    for row in row_min..row_max.min(height) {
        for col in col_min..col_max.min(width) {
            let dx = col as f64 - x0;
            let dy = row as f64 - y0;
            let d2 = dx * dx + dy * dy;
            if d2 <= cutoff_sq {
                field[[row, col]] += amplitude * (-d2 * inv_two_sigma2).exp();
            }
        }
    }
}

/// Circularly shift an image so that pixel `(x, y)` moves to `(x + dx, y + dy)`.
///
/// Content leaving one edge wraps around to the opposite edge.
pub fn circular_shift(image: &ArrayView2<f64>, dx: i64, dy: i64) -> Array2<f64> {
    let (height, width) = image.dim();
    let h = height as i64;
    let w = width as i64;
    Array2::from_shape_fn((height, width), |(row, col)| {
        let src_row = (row as i64 - dy).rem_euclid(h) as usize;
        let src_col = (col as i64 - dx).rem_euclid(w) as usize;
        image[[src_row, src_col]]
    })
}
