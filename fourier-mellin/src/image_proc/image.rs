use image::{DynamicImage, GrayImage, Luma};
use ndarray::Array2;

/// Converts any decoded image to a luminance array in [0, 1]
///
/// Color images are reduced to luminance with the image crate's standard
/// weights. The array has shape (height, width) and index [y, x] holds pixel (x, y).
///
/// # Arguments
/// * `img` - Decoded image of any pixel format
///
/// # Returns
/// * An Array2<f64> with one sample per pixel
pub fn dynamic_image_to_array2(img: &DynamicImage) -> Array2<f64> {
    let luma = img.to_luma32f();
    let (width, height) = luma.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        luma.get_pixel(x as u32, y as u32)[0] as f64
    })
}

/// Converts an Array2<f64> to an 8-bit GrayImage, stretching min..max to 0..255
///
/// Used to dump spectra and log-polar maps, whose value ranges are arbitrary.
/// A constant array maps to black.
///
/// # Arguments
/// * `arr` - Reference to an Array2<f64> of any range
///
/// # Returns
/// * A new GrayImage with dimensions (width, height)
pub fn array2_to_gray_image(arr: &Array2<f64>) -> GrayImage {
    let (height, width) = arr.dim();

    let (min, max) = arr
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    let mut img = GrayImage::new(width as u32, height as u32);
    for y in 0..height {
        for x in 0..width {
            let v = arr[[y, x]];
            let scaled = if range > 0.0 && v.is_finite() {
                ((v - min) / range * 255.0).round().clamp(0.0, 255.0) as u8
            } else {
                0
            };
            img.put_pixel(x as u32, y as u32, Luma([scaled]));
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gray_round_trip_layout() {
        let mut gray = GrayImage::new(3, 2);
        gray.put_pixel(2, 1, Luma([255]));
        gray.put_pixel(0, 0, Luma([51]));

        let arr = dynamic_image_to_array2(&DynamicImage::ImageLuma8(gray));
        assert_eq!(arr.dim(), (2, 3));
        assert_relative_eq!(arr[[1, 2]], 1.0, epsilon = 1e-6);
        assert_relative_eq!(arr[[0, 0]], 0.2, epsilon = 1e-6);
        assert_eq!(arr[[0, 1]], 0.0);
    }

    #[test]
    fn test_stretch_to_full_range() {
        let arr = Array2::from_shape_vec((1, 3), vec![-2.0, 0.0, 2.0]).unwrap();
        let img = array2_to_gray_image(&arr);
        assert_eq!(img.dimensions(), (3, 1));
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(1, 0)[0], 128);
        assert_eq!(img.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_constant_array_is_black() {
        let arr = Array2::from_elem((2, 2), 4.0);
        let img = array2_to_gray_image(&arr);
        assert!(img.pixels().all(|p| p[0] == 0));
    }
}
