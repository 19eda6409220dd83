//! Error types for preprocessing, recognition and extraction.
//!
//! "No code found" is not an error: it is reported as
//! [`ExtractionResult::NotFound`](crate::ExtractionResult::NotFound).

use thiserror::Error;

/// Errors raised while transforming an input image.
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// The input image has no pixels.
    #[error("input image is empty ({width}x{height})")]
    EmptyImage {
        /// Input width in pixels
        width: u32,
        /// Input height in pixels
        height: u32,
    },

    /// A stage would produce an image with a zero dimension.
    #[error("{stage} produced a degenerate image ({width}x{height})")]
    DegenerateGeometry {
        /// Stage name (e.g. "crop", "resize")
        stage: &'static str,
        /// Resulting width
        width: u32,
        /// Resulting height
        height: u32,
    },

    /// A configuration parameter is out of range.
    #[error("invalid preprocessing parameter: {0}")]
    InvalidParameter(String),

    /// The input could not be decoded as an image.
    #[error("unsupported or unreadable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors raised by an OCR engine or vision model.
#[derive(Error, Debug)]
pub enum RecognizerError {
    /// The engine could not be initialized.
    #[error("failed to initialize recognizer: {0}")]
    Init(String),

    /// The engine failed while reading an image.
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// A remote engine could not be reached or returned an unusable response.
    #[error("remote recognizer error: {0}")]
    Transport(String),
}

/// Errors raised while building configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A code rule is unusable (e.g. zero length).
    #[error("invalid code rule: {0}")]
    InvalidRule(String),

    /// A substitution table maps into characters outside `[A-Z0-9]`.
    #[error("invalid substitution {from:?} -> {to:?}: both sides must be in [A-Z0-9]")]
    InvalidSubstitution {
        /// Source character
        from: char,
        /// Replacement character
        to: char,
    },

    /// A preprocessing section is out of range.
    #[error("invalid preprocessing config: {0}")]
    Preprocess(#[from] PreprocessError),

    /// Unknown preset name.
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// A configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that abort extraction for a single image.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    /// The recognizer failed on one orientation.
    #[error("recognizer failed at {angle} degrees: {source}")]
    Recognizer {
        /// Orientation being read when the failure happened
        angle: u16,
        /// Underlying recognizer error
        #[source]
        source: RecognizerError,
    },

    /// The batch was cancelled before this image was started.
    #[error("extraction cancelled")]
    Cancelled,
}
