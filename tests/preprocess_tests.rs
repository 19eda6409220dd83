//! Preprocessing and rotation properties on synthetic images.

use capcode::PreprocessError;
use capcode::preprocess::{
    Conditioning, CropMargins, PRESET_NAMES, PreprocessConfig, Threshold, decode, preprocess,
};
use capcode::utils::geometry::{expanded_dimensions, rotate_expand};
use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::io::Cursor;

fn dotted_text() -> DynamicImage {
    // Light background with a row of dark 2x2 "dots"
    let mut img = RgbImage::from_pixel(120, 60, Rgb([210, 200, 170]));
    for i in 0..10 {
        let x = 20 + i * 8;
        for dy in 0..2 {
            for dx in 0..2 {
                img.put_pixel(x + dx, 29 + dy, Rgb([30, 25, 20]));
            }
        }
    }
    DynamicImage::ImageRgb8(img)
}

#[test]
fn every_preset_produces_grayscale() {
    let input = dotted_text();
    for name in PRESET_NAMES {
        let cfg = PreprocessConfig::preset(name).unwrap();
        let out = preprocess(&input, &cfg).unwrap();
        assert!(matches!(out, DynamicImage::ImageLuma8(_)), "{name}");
        let (w, h) = out.dimensions();
        assert!(w > 0 && h > 0, "{name}");
    }
}

#[test]
fn preprocessing_leaves_input_untouched() {
    let input = dotted_text();
    let before = input.clone();
    let _ = preprocess(&input, &PreprocessConfig::glare()).unwrap();
    assert_eq!(input, before);
}

#[test]
fn binarized_output_is_two_level() {
    let cfg = PreprocessConfig {
        conditioning: Conditioning::Binarize {
            threshold: Threshold::Otsu,
        },
        ..PreprocessConfig::minimal()
    };
    let out = preprocess(&dotted_text(), &cfg).unwrap().to_luma8();
    assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    assert_eq!(out.get_pixel(20, 29)[0], 0);
    assert_eq!(out.get_pixel(5, 5)[0], 255);
}

#[test]
fn decode_accepts_encoded_bytes() {
    let mut bytes = Vec::new();
    dotted_text()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (120, 60));
}

#[test]
fn crop_that_consumes_image_is_rejected() {
    let cfg = PreprocessConfig {
        crop: CropMargins {
            top: 0.5,
            bottom: 0.5,
            ..CropMargins::default()
        },
        ..PreprocessConfig::minimal()
    };
    let err = preprocess(&dotted_text(), &cfg).unwrap_err();
    assert!(matches!(err, PreprocessError::InvalidParameter(_)));
}

#[test]
fn rotation_never_clips_content() {
    // Dark frame around a light interior: every frame pixel must survive
    let mut gray = GrayImage::from_pixel(50, 30, Luma([255]));
    for x in 0..50 {
        for y in [0, 1, 28, 29] {
            gray.put_pixel(x, y, Luma([0]));
        }
    }
    let src = DynamicImage::ImageLuma8(gray);
    let dark_before = src.to_luma8().pixels().filter(|p| p[0] == 0).count();

    for degrees in [0.0f32, 90.0, 180.0, 270.0] {
        let out = rotate_expand(&src, degrees, [255, 255, 255]).to_luma8();
        let dark = out.pixels().filter(|p| p[0] == 0).count();
        assert_eq!(dark, dark_before, "{degrees} degrees");
    }

    for degrees in [15.0f32, 45.0, 120.0, 333.0] {
        let out = rotate_expand(&src, degrees, [255, 255, 255]).to_luma8();
        assert_eq!(out.dimensions(), expanded_dimensions(50, 30, degrees));
        // Nearest-neighbour sampling may drop a few pixels on the diagonal,
        // but the stripes reach the rotated corners
        let (w, h) = out.dimensions();
        let dark = out.pixels().filter(|p| p[0] == 0).count();
        assert!(dark as f32 > dark_before as f32 * 0.8, "{degrees} degrees: {dark}");
        assert!(w >= 30 && h >= 30);
    }
}
