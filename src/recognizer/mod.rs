//! The OCR seam.
//!
//! The pipeline only sees [`Recognizer`]: an image goes in, raw text tokens
//! come out. Local engines, remote vision models and scripted test doubles
//! all plug in here.

#[cfg(feature = "remote")]
pub mod openai;
#[cfg(feature = "tesseract")]
pub mod tesseract;
pub mod vision;

#[cfg(feature = "remote")]
pub use openai::OpenAiVisionModel;
#[cfg(feature = "tesseract")]
pub use tesseract::{TesseractConfig, TesseractRecognizer};
pub use vision::{DEFAULT_INSTRUCTIONS, VisionModel, VisionRecognizer};

use crate::error::RecognizerError;
use image::DynamicImage;
use once_cell::sync::OnceCell;

/// Characters a code may contain, in the form recognizers take as an allowlist.
pub const CODE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Text recognizer: image in, raw tokens out.
///
/// `allowlist`, when given, lists the only characters the engine should
/// emit. Engines that cannot restrict their output may ignore it; the
/// normalizer cleans tokens regardless.
pub trait Recognizer: Send + Sync {
    /// Read text from `image`.
    fn recognize(
        &self,
        image: &DynamicImage,
        allowlist: Option<&str>,
    ) -> Result<Vec<String>, RecognizerError>;
}

impl<F> Recognizer for F
where
    F: Fn(&DynamicImage) -> Result<Vec<String>, RecognizerError> + Send + Sync,
{
    fn recognize(
        &self,
        image: &DynamicImage,
        _allowlist: Option<&str>,
    ) -> Result<Vec<String>, RecognizerError> {
        self(image)
    }
}

/// A recognizer slot filled at most once.
///
/// Concurrent first callers block until one `init` finishes. If `init`
/// fails the slot stays empty and a later call runs its own `init`.
pub struct RecognizerCell {
    cell: OnceCell<Box<dyn Recognizer>>,
}

impl RecognizerCell {
    /// Empty slot
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The stored recognizer, running `init` if the slot is empty.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<&dyn Recognizer, RecognizerError>
    where
        F: FnOnce() -> Result<Box<dyn Recognizer>, RecognizerError>,
    {
        self.cell.get_or_try_init(init).map(|boxed| &**boxed)
    }

    /// The stored recognizer, if initialized.
    pub fn get(&self) -> Option<&dyn Recognizer> {
        self.cell.get().map(|boxed| &**boxed)
    }
}

impl Default for RecognizerCell {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: RecognizerCell = RecognizerCell::new();

/// Process-wide recognizer, initialized on first use.
///
/// See [`RecognizerCell`] for the initialization rules.
pub fn shared<F>(init: F) -> Result<&'static dyn Recognizer, RecognizerError>
where
    F: FnOnce() -> Result<Box<dyn Recognizer>, RecognizerError>,
{
    SHARED.get_or_try_init(init)
}

/// The process-wide recognizer, if one was initialized.
pub fn try_shared() -> Option<&'static dyn Recognizer> {
    SHARED.get()
}

/// PNG-encode an image for engines that take encoded bytes.
#[cfg(any(feature = "tesseract", feature = "remote"))]
pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, RecognizerError> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| RecognizerError::Recognition(format!("failed to encode image to PNG: {e}")))?;
    Ok(buf.into_inner())
}
