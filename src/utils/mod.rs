//! Pixel-level helpers shared by the preprocessor and the sweep:
//! - luminance conversion (RGB/RGBA to 8-bit gray)
//! - black/white cutoffs (fixed and Otsu)
//! - crop rectangles, resize dimensions, rotation with frame expansion

pub mod binarization;
pub mod geometry;
pub mod grayscale;
