//! Geometry helpers: crop rectangles, aspect-preserving resize and rotation
//! with frame expansion.

use crate::models::Orientation;
use crate::utils::grayscale::luma_of;
use image::{DynamicImage, ImageBuffer, Luma, Pixel, Rgb, Rgba};

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Central region left after discarding a fraction of each edge.
///
/// Fractions are of the full width/height. Returns `None` when nothing
/// would remain.
pub fn central_rect(
    width: u32,
    height: u32,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
) -> Option<Rect> {
    let x0 = (width as f32 * left).round() as u32;
    let y0 = (height as f32 * top).round() as u32;
    let x1 = width.saturating_sub((width as f32 * right).round() as u32);
    let y1 = height.saturating_sub((height as f32 * bottom).round() as u32);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

/// Dimensions after scaling to `target_width`, preserving aspect ratio.
pub fn scaled_dimensions(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    if width == 0 {
        return (0, 0);
    }
    let scale = target_width as f64 / width as f64;
    let new_height = (height as f64 * scale).round() as u32;
    (target_width, new_height)
}

/// Canvas size needed to hold an image rotated by `degrees` without clipping.
pub fn expanded_dimensions(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let w = width as f32 * cos + height as f32 * sin;
    let h = width as f32 * sin + height as f32 * cos;
    // Absorb float noise so 90 degrees does not grow by a pixel
    ((w - 1e-3).ceil().max(1.0) as u32, (h - 1e-3).ceil().max(1.0) as u32)
}

/// Rotate clockwise by one of the sweep orientations.
///
/// Right angles transpose pixels exactly, so no border is exposed and the
/// fill colour never appears.
pub fn rotate_orientation(image: &DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Deg0 => image.clone(),
        Orientation::Deg90 => image.rotate90(),
        Orientation::Deg180 => image.rotate180(),
        Orientation::Deg270 => image.rotate270(),
    }
}

/// Rotate clockwise by an arbitrary angle, expanding the frame so no content
/// is clipped. Exposed border pixels take the `fill` colour.
pub fn rotate_expand(image: &DynamicImage, degrees: f32, fill: [u8; 3]) -> DynamicImage {
    let normalized = degrees.rem_euclid(360.0);
    for orientation in Orientation::ALL {
        if (normalized - orientation.degrees() as f32).abs() < f32::EPSILON {
            return rotate_orientation(image, orientation);
        }
    }

    match image {
        DynamicImage::ImageLuma8(gray) => {
            DynamicImage::ImageLuma8(rotate_buffer(gray, normalized, Luma([fill_luma(fill)])))
        }
        DynamicImage::ImageRgb8(rgb) => {
            DynamicImage::ImageRgb8(rotate_buffer(rgb, normalized, Rgb(fill)))
        }
        DynamicImage::ImageRgba8(rgba) => DynamicImage::ImageRgba8(rotate_buffer(
            rgba,
            normalized,
            Rgba([fill[0], fill[1], fill[2], 255]),
        )),
        other => DynamicImage::ImageRgba8(rotate_buffer(
            &other.to_rgba8(),
            normalized,
            Rgba([fill[0], fill[1], fill[2], 255]),
        )),
    }
}

/// Grey fills keep their exact level; colours go through the luma weights.
fn fill_luma(fill: [u8; 3]) -> u8 {
    if fill[0] == fill[1] && fill[1] == fill[2] {
        fill[0]
    } else {
        luma_of(fill)
    }
}

/// Nearest-neighbour inverse mapping into an expanded canvas
fn rotate_buffer<P>(src: &ImageBuffer<P, Vec<u8>>, degrees: f32, fill: P) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = src.dimensions();
    let (out_w, out_h) = expanded_dimensions(width, height, degrees);
    let mut out = ImageBuffer::from_pixel(out_w, out_h, fill);

    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (src_cx, src_cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let (dst_cx, dst_cy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - dst_cx;
        let dy = y as f32 + 0.5 - dst_cy;
        // Inverse of a clockwise rotation in y-down coordinates
        let sx = cos * dx + sin * dy + src_cx;
        let sy = -sin * dx + cos * dy + src_cy;
        if sx >= 0.0 && sy >= 0.0 {
            let (ix, iy) = (sx as u32, sy as u32);
            if ix < width && iy < height {
                *pixel = *src.get_pixel(ix, iy);
            }
        }
    }

    out
}
