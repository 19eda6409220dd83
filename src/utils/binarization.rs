//! Two-level conversion: Otsu and fixed cutoffs.

use image::{GrayImage, Luma};

/// Ink value after binarization
pub const INK: u8 = 0;
/// Background value after binarization
pub const PAPER: u8 = 255;

/// Convert grayscale image to black/white using Otsu's thresholding method
/// Pixels darker than the threshold become ink (0), the rest paper (255)
pub fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    let threshold = calculate_otsu_threshold(gray.as_raw());
    threshold_binarize(gray, threshold)
}

/// Calculate Otsu's optimal threshold
pub fn calculate_otsu_threshold(gray: &[u8]) -> u8 {
    // Build histogram
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total_pixels = gray.len() as f64;
    if total_pixels == 0.0 {
        return 128;
    }
    let total_sum: u64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as u64 * c)
        .sum();

    let mut max_variance = 0.0;
    let mut optimal_threshold = 128u8;
    let mut class1_pixels = 0u64;
    let mut class1_sum = 0u64;

    // Class 1 holds intensities strictly below the threshold
    for threshold in 1..=255usize {
        class1_pixels += histogram[threshold - 1];
        class1_sum += (threshold as u64 - 1) * histogram[threshold - 1];

        let class2_pixels = gray.len() as u64 - class1_pixels;
        if class1_pixels == 0 || class2_pixels == 0 {
            continue;
        }

        let class1_mean = class1_sum as f64 / class1_pixels as f64;
        let class2_mean = (total_sum - class1_sum) as f64 / class2_pixels as f64;

        let weight1 = class1_pixels as f64 / total_pixels;
        let weight2 = class2_pixels as f64 / total_pixels;

        let variance = weight1 * weight2 * (class1_mean - class2_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold as u8;
        }
    }

    optimal_threshold
}

/// Simple global threshold binarization
pub fn threshold_binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut binary = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel[0] < threshold { INK } else { PAPER };
        binary.put_pixel(x, y, Luma([value]));
    }
    binary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_binarize() {
        let gray = GrayImage::from_raw(2, 2, vec![100, 150, 200, 50]).unwrap();
        let binary = threshold_binarize(&gray, 128);

        // Pixels < 128 should be ink
        assert_eq!(binary.get_pixel(0, 0)[0], INK); // 100 < 128
        assert_eq!(binary.get_pixel(1, 0)[0], PAPER); // 150 >= 128
        assert_eq!(binary.get_pixel(0, 1)[0], PAPER); // 200 >= 128
        assert_eq!(binary.get_pixel(1, 1)[0], INK); // 50 < 128
    }

    #[test]
    fn test_otsu_binarize() {
        // Create a simple two-class image
        let mut pixels = vec![50u8; 50]; // Dark class
        pixels.extend(vec![200u8; 50]); // Light class
        let gray = GrayImage::from_raw(10, 10, pixels).unwrap();

        let threshold = calculate_otsu_threshold(gray.as_raw());
        assert!(threshold > 50 && threshold <= 200);

        let binary = otsu_binarize(&gray);
        assert_eq!(binary.get_pixel(0, 0)[0], INK);
        assert_eq!(binary.get_pixel(0, 7)[0], PAPER);
    }

    #[test]
    fn test_otsu_empty_defaults() {
        assert_eq!(calculate_otsu_threshold(&[]), 128);
    }
}
