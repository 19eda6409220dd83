//! capcode - bottle-cap serial code extraction
//!
//! Turns a photograph of a bottle cap into the fixed-length alphanumeric code
//! printed on it. The image is preprocessed, read by a pluggable
//! [`Recognizer`] at four orientations, and the noisy text is cleaned,
//! validated against a [`CodeRule`] and, failing an exact match, ranked for
//! the closest near-miss.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Parallel extraction over many images
pub mod batch;
/// Pipeline configuration and environment overrides
pub mod config;
/// Error types
pub mod error;
/// Token cleaning, validation, ranking and correction
pub mod matcher;
/// Core data structures (Candidate, CodeRule, ExtractionResult, Orientation)
pub mod models;
/// Orientation sweep and result selection
pub mod pipeline;
/// Geometric and photometric preprocessing
pub mod preprocess;
/// OCR engine seam and adapters
pub mod recognizer;
/// Image loading and dataset helpers for the CLI and benches
pub mod tools;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

pub use batch::{BatchSummary, CancelFlag, extract_batch};
pub use config::PipelineConfig;
pub use error::{ConfigError, ExtractError, PreprocessError, RecognizerError};
pub use models::{Candidate, CodeRule, ExtractionResult, Orientation, OrientationResult};
pub use pipeline::SweepOptions;
pub use preprocess::{PreprocessConfig, preprocess};
pub use recognizer::{Recognizer, VisionModel, VisionRecognizer};

use image::DynamicImage;

/// Extract a code from one image.
///
/// # Arguments
/// * `image` - Photograph of the cap; never modified
/// * `cfg` - Preprocessing stages
/// * `rule` - Required code shape
/// * `recognizer` - OCR engine
///
/// # Returns
/// `Exact`, `BestGuess` or `NotFound`. Errors are reserved for unusable
/// input and recognizer failures.
///
/// # Example
/// ```
/// use capcode::{CodeRule, ExtractionResult, PreprocessConfig, RecognizerError};
/// use image::{DynamicImage, GrayImage};
///
/// let photo = DynamicImage::ImageLuma8(GrayImage::new(64, 32));
/// let ocr = |_: &DynamicImage| Ok::<_, RecognizerError>(vec!["krat-1n2ab".to_string()]);
/// let rule = CodeRule::new(9).unwrap().with_digit_counts([0, 2]);
/// let result = capcode::extract(&photo, &PreprocessConfig::standard(), &rule, &ocr).unwrap();
/// assert_eq!(result.code(), Some("KRAT1N2AB"));
/// ```
pub fn extract<R: Recognizer + ?Sized>(
    image: &DynamicImage,
    cfg: &PreprocessConfig,
    rule: &CodeRule,
    recognizer: &R,
) -> Result<ExtractionResult, ExtractError> {
    let config = PipelineConfig::new(cfg.clone(), rule.clone());
    pipeline::run(image, &config, recognizer)
}

/// Extractor bundling a pipeline configuration with a recognizer
pub struct Extractor<R> {
    config: PipelineConfig,
    recognizer: R,
}

impl<R: Recognizer> Extractor<R> {
    /// Create an extractor with the default configuration
    pub fn new(recognizer: R) -> Self {
        Self::with_config(recognizer, PipelineConfig::default())
    }

    /// Create an extractor with an explicit configuration
    pub fn with_config(recognizer: R, config: PipelineConfig) -> Self {
        Self { config, recognizer }
    }

    /// Current configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract a code from one image
    pub fn extract(&self, image: &DynamicImage) -> Result<ExtractionResult, ExtractError> {
        pipeline::run(image, &self.config, &self.recognizer)
    }

    /// Extract from many images in parallel, results in input order
    pub fn extract_batch(
        &self,
        images: &[DynamicImage],
        cancel: &CancelFlag,
    ) -> Vec<Result<ExtractionResult, ExtractError>> {
        batch::extract_batch(images, &self.config, &self.recognizer, cancel)
    }

    /// Display caption for a result under this extractor's rule
    pub fn caption(&self, result: &ExtractionResult) -> String {
        result.caption(&self.config.rule)
    }
}
