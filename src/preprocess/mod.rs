//! Geometric/photometric preprocessing.
//!
//! Stages run in a fixed order, each enabled by [`PreprocessConfig`]:
//! resize, crop, grayscale, contrast (equalize then factor), stroke
//! conditioning, inversion. The input is never modified.

pub mod config;
pub mod photometric;

pub use config::{Conditioning, CropMargins, PRESET_NAMES, PreprocessConfig, Threshold};

use crate::error::PreprocessError;
use crate::utils::geometry::{central_rect, scaled_dimensions};
use crate::utils::grayscale::to_luma;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

/// Decode an encoded image (PNG, JPEG, ...) supplied as bytes.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
    let image = image::load_from_memory(bytes)?;
    ensure_non_empty(&image)?;
    Ok(image)
}

fn ensure_non_empty(image: &DynamicImage) -> Result<(), PreprocessError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { width, height });
    }
    Ok(())
}

/// Run every enabled stage on `image` and return the transformed copy.
pub fn preprocess(
    image: &DynamicImage,
    cfg: &PreprocessConfig,
) -> Result<DynamicImage, PreprocessError> {
    cfg.validate()?;
    ensure_non_empty(image)?;

    let mut current = resize_stage(image, cfg)?;
    if cfg.crops() {
        current = crop_stage(&current, cfg)?;
    }

    if !cfg.needs_luma() {
        if cfg.invert {
            current.invert();
        }
        return Ok(current);
    }

    let mut gray = to_luma(&current);
    if cfg.equalize {
        gray = photometric::equalize(&gray);
    }
    if let Some(factor) = cfg.contrast {
        gray = photometric::adjust_contrast(&gray, factor);
    }
    gray = photometric::condition(&gray, cfg.conditioning);
    if cfg.invert {
        gray = photometric::invert(&gray);
    }

    debug!(
        width = gray.width(),
        height = gray.height(),
        conditioning = ?cfg.conditioning,
        "preprocessed image"
    );
    Ok(DynamicImage::ImageLuma8(gray))
}

fn resize_stage(
    image: &DynamicImage,
    cfg: &PreprocessConfig,
) -> Result<DynamicImage, PreprocessError> {
    let (width, height) = image.dimensions();
    let Some(target) = cfg.target_width.filter(|&t| t != width) else {
        return Ok(image.clone());
    };

    let (new_w, new_h) = scaled_dimensions(width, height, target);
    if new_w == 0 || new_h == 0 {
        return Err(PreprocessError::DegenerateGeometry {
            stage: "resize",
            width: new_w,
            height: new_h,
        });
    }
    debug!(from_w = width, from_h = height, to_w = new_w, to_h = new_h, "resize");
    Ok(image.resize_exact(new_w, new_h, FilterType::Lanczos3))
}

fn crop_stage(
    image: &DynamicImage,
    cfg: &PreprocessConfig,
) -> Result<DynamicImage, PreprocessError> {
    let (width, height) = image.dimensions();
    let m = cfg.crop;
    let rect = central_rect(width, height, m.left, m.top, m.right, m.bottom).ok_or(
        PreprocessError::DegenerateGeometry {
            stage: "crop",
            width: 0,
            height: 0,
        },
    )?;
    debug!(x = rect.x, y = rect.y, w = rect.width, h = rect.height, "crop");
    Ok(image.crop_imm(rect.x, rect.y, rect.width, rect.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([180, 170, 160])))
    }

    #[test]
    fn test_empty_image_rejected() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let err = preprocess(&empty, &PreprocessConfig::standard()).unwrap_err();
        assert!(matches!(err, PreprocessError::EmptyImage { .. }));
    }

    #[test]
    fn test_unreadable_bytes_rejected() {
        let err = decode(b"definitely not a png").unwrap_err();
        assert!(matches!(err, PreprocessError::Decode(_)));
    }

    #[test]
    fn test_degenerate_crop_rejected() {
        // 45% of 2 px rounds to a full pixel per edge
        let tiny = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        let mut cfg = PreprocessConfig::minimal();
        cfg.crop = CropMargins::uniform(0.45);
        let err = preprocess(&tiny, &cfg).unwrap_err();
        assert!(matches!(err, PreprocessError::DegenerateGeometry { stage: "crop", .. }));
    }

    #[test]
    fn test_resize_then_crop_dimensions() {
        let mut cfg = PreprocessConfig::minimal();
        cfg.target_width = Some(200);
        cfg.crop = CropMargins::uniform(0.1);
        let out = preprocess(&sample(), &cfg).unwrap();
        // 200x100 after resize, 10% off each edge
        assert_eq!(out.dimensions(), (160, 80));
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_passthrough_keeps_colour_and_input() {
        let input = sample();
        let out = preprocess(&input, &PreprocessConfig::passthrough()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_invert_only_on_grayscale() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([10])));
        let mut cfg = PreprocessConfig::minimal();
        cfg.invert = true;
        let out = preprocess(&gray, &cfg).unwrap().to_luma8();
        assert_eq!(out.get_pixel(0, 0)[0], 245);
    }

    #[test]
    fn test_standard_preset_is_deterministic() {
        let input = sample();
        let a = preprocess(&input, &PreprocessConfig::standard()).unwrap();
        let b = preprocess(&input, &PreprocessConfig::standard()).unwrap();
        assert_eq!(a, b);
    }
}
