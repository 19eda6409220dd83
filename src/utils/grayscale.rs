//! Convert RGB/RGBA pixels to luminance
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
//!
//! Large images are converted row-parallel with rayon.

use image::{DynamicImage, GenericImageView, GrayImage};
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: i32 = 76;
const COEF_G: i32 = 150;
const COEF_B: i32 = 29;

/// Pixel count above which conversion switches to the parallel path
const PARALLEL_THRESHOLD: usize = 1 << 20;

/// Luminance of a single RGB triple
#[inline]
pub fn luma_of(rgb: [u8; 3]) -> u8 {
    let lum = (COEF_R * rgb[0] as i32 + COEF_G * rgb[1] as i32 + COEF_B * rgb[2] as i32) >> 8;
    lum.min(255) as u8
}

/// Convert any decoded image to an 8-bit grayscale image.
pub fn to_luma(image: &DynamicImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let parallel = w * h >= PARALLEL_THRESHOLD;

    let pixels = match image {
        DynamicImage::ImageLuma8(gray) => return gray.clone(),
        DynamicImage::ImageRgb8(rgb) => {
            if parallel {
                rgb_to_grayscale_parallel(rgb.as_raw(), w, h)
            } else {
                rgb_to_grayscale(rgb.as_raw(), w, h)
            }
        }
        DynamicImage::ImageRgba8(rgba) => {
            if parallel {
                rgba_to_grayscale_parallel(rgba.as_raw(), w, h)
            } else {
                rgba_to_grayscale(rgba.as_raw(), w, h)
            }
        }
        other => {
            let rgba = other.to_rgba8();
            if parallel {
                rgba_to_grayscale_parallel(rgba.as_raw(), w, h)
            } else {
                rgba_to_grayscale(rgba.as_raw(), w, h)
            }
        }
    };

    // Buffer length is width * height by construction
    GrayImage::from_raw(width, height, pixels).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Convert packed RGB bytes to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert_rows(rgb, width * height, 3)
}

/// Convert packed RGBA bytes to grayscale (ignores alpha channel)
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert_rows(rgba, width * height, 4)
}

fn convert_rows(data: &[u8], pixel_count: usize, stride: usize) -> Vec<u8> {
    data.chunks_exact(stride)
        .take(pixel_count)
        .map(|px| luma_of([px[0], px[1], px[2]]))
        .collect()
}

/// Convert RGB to grayscale using parallel processing
/// Processes rows in parallel for multi-core speedup
pub fn rgb_to_grayscale_parallel(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert_rows_parallel(rgb, width, height, 3)
}

/// Convert RGBA to grayscale using parallel processing
pub fn rgba_to_grayscale_parallel(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert_rows_parallel(rgba, width, height, 4)
}

fn convert_rows_parallel(data: &[u8], width: usize, height: usize, stride: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * stride;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * stride;
            *out = luma_of([data[idx], data[idx + 1], data[idx + 2]]);
        }
    });

    gray
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_rgb_to_grayscale() {
        // Pure white
        let gray = rgb_to_grayscale(&[255, 255, 255], 1, 1);
        assert!(gray[0] >= 254);

        // Pure black
        let gray = rgb_to_grayscale(&[0, 0, 0], 1, 1);
        assert_eq!(gray[0], 0);

        // Pure green dominates luminance
        let gray = rgb_to_grayscale(&[0, 255, 0], 1, 1);
        assert!(gray[0] > 100);

        // 2x2 image
        let img = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let gray = rgb_to_grayscale(&img, 2, 2);
        assert_eq!(gray.len(), 4);
    }

    #[test]
    fn test_parallel_matches_scalar() {
        let data: Vec<u8> = (0..(7 * 5 * 3)).map(|v| (v * 37 % 256) as u8).collect();
        assert_eq!(
            rgb_to_grayscale(&data, 7, 5),
            rgb_to_grayscale_parallel(&data, 7, 5)
        );
    }

    #[test]
    fn test_to_luma_preserves_dimensions() {
        let img = RgbImage::from_pixel(13, 4, Rgb([200, 100, 50]));
        let gray = to_luma(&DynamicImage::ImageRgb8(img));
        assert_eq!(gray.dimensions(), (13, 4));
        assert_eq!(gray.get_pixel(0, 0)[0], luma_of([200, 100, 50]));
    }
}
