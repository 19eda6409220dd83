//! Luminance-only stages: contrast, stroke conditioning, inversion.

use super::config::{Conditioning, Threshold};
use crate::utils::binarization::{otsu_binarize, threshold_binarize};
use image::{GrayImage, imageops};

/// 3x3 sharpen kernel, normalized by its sum (16) inside `filter3x3`
const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];

/// Rounded mean luminance
pub fn mean_luma(gray: &GrayImage) -> u8 {
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return 0;
    }
    let sum: u64 = pixels.iter().map(|&v| v as u64).sum();
    ((sum as f64 / pixels.len() as f64) + 0.5) as u8
}

/// Scale each pixel's distance from the mean luminance by `factor`.
///
/// 0.0 gives a flat grey image, 1.0 the original.
pub fn adjust_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let mean = mean_luma(gray) as f32;
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        let v = mean + factor * (pixel[0] as f32 - mean);
        pixel[0] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Histogram equalization
pub fn equalize(gray: &GrayImage) -> GrayImage {
    imageproc::contrast::equalize_histogram(gray)
}

/// Apply the configured stroke conditioning.
pub fn condition(gray: &GrayImage, conditioning: Conditioning) -> GrayImage {
    match conditioning {
        Conditioning::None => gray.clone(),
        Conditioning::Sharpen => sharpen(gray),
        Conditioning::UnsharpMask { sigma, threshold } => {
            imageops::unsharpen(gray, sigma, threshold)
        }
        Conditioning::GaussianBlur { sigma } => imageproc::filter::gaussian_blur_f32(gray, sigma),
        Conditioning::Binarize { threshold } => match threshold {
            Threshold::Fixed(cutoff) => threshold_binarize(gray, cutoff),
            Threshold::Otsu => otsu_binarize(gray),
        },
        Conditioning::Close { radius } => max_filter(&min_filter(gray, radius), radius),
        Conditioning::Open { radius } => min_filter(&max_filter(gray, radius), radius),
    }
}

/// 3x3 sharpen. `filter3x3` leaves the one-pixel frame black, so the
/// frame keeps its input values instead.
pub fn sharpen(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut out = imageops::filter3x3(gray, &SHARPEN_KERNEL);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
            *pixel = *gray.get_pixel(x, y);
        }
    }
    out
}

/// Grayscale erosion of the bright background (grows dark ink)
pub fn min_filter(gray: &GrayImage, radius: u8) -> GrayImage {
    rank_filter(gray, radius, std::cmp::min)
}

/// Grayscale dilation of the bright background (shrinks dark ink)
pub fn max_filter(gray: &GrayImage, radius: u8) -> GrayImage {
    rank_filter(gray, radius, std::cmp::max)
}

/// Square-window filter, window clamped at the image border
fn rank_filter(gray: &GrayImage, radius: u8, pick: fn(u8, u8) -> u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let r = radius as u32;
    let mut out = GrayImage::new(width, height);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let (x0, x1) = (x.saturating_sub(r), (x + r).min(width - 1));
        let (y0, y1) = (y.saturating_sub(r), (y + r).min(height - 1));
        let mut acc = gray.get_pixel(x, y)[0];
        for wy in y0..=y1 {
            for wx in x0..=x1 {
                acc = pick(acc, gray.get_pixel(wx, wy)[0]);
            }
        }
        pixel[0] = acc;
    }
    out
}

/// Swap dark and light
pub fn invert(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    imageops::invert(&mut out);
    out
}
