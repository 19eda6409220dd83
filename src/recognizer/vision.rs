//! Adapter from free-text vision models to [`Recognizer`](super::Recognizer).

use super::Recognizer;
use crate::error::RecognizerError;
use image::DynamicImage;

/// Instructions sent to a vision model when none are configured.
pub const DEFAULT_INSTRUCTIONS: &str = "Read the serial code printed on this bottle cap. \
Ignore embossed logos and rim text. Reply with the code only, no other words.";

/// A multimodal model that answers free-text questions about an image.
pub trait VisionModel: Send + Sync {
    /// Return the model's text response to `instructions` about `image`.
    fn describe(&self, image: &DynamicImage, instructions: &str) -> Result<String, RecognizerError>;
}

/// Adapts a [`VisionModel`] to the [`Recognizer`] seam.
///
/// The response is split on whitespace into tokens; cleaning and validation
/// still happen downstream, so chatty answers degrade into extra candidates
/// rather than failures.
pub struct VisionRecognizer<M> {
    model: M,
    instructions: String,
}

impl<M: VisionModel> VisionRecognizer<M> {
    /// Wrap `model` with [`DEFAULT_INSTRUCTIONS`].
    pub fn new(model: M) -> Self {
        Self {
            model,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    /// Replace the instructions sent with each image.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    fn prompt(&self, allowlist: Option<&str>) -> String {
        match allowlist {
            Some(chars) => format!("{} Use only these characters: {chars}", self.instructions),
            None => self.instructions.clone(),
        }
    }
}

impl<M: VisionModel> Recognizer for VisionRecognizer<M> {
    fn recognize(
        &self,
        image: &DynamicImage,
        allowlist: Option<&str>,
    ) -> Result<Vec<String>, RecognizerError> {
        let response = self.model.describe(image, &self.prompt(allowlist))?;
        Ok(response.split_whitespace().map(str::to_string).collect())
    }
}
