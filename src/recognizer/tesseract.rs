//! Local OCR through Tesseract (`leptess`).

use super::{Recognizer, encode_png};
use crate::error::RecognizerError;
use image::DynamicImage;
use leptess::{LepTess, Variable};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use tracing::debug;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseractConfig {
    /// Traineddata language code
    pub language: String,
    /// Directory holding traineddata files, or the Tesseract default
    pub datapath: Option<String>,
    /// Page segmentation mode (7 = single text line, 6 = single block)
    pub page_segmentation_mode: u8,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            datapath: None,
            page_segmentation_mode: 6,
        }
    }
}

thread_local! {
    // LepTess handles are not Sync; each worker thread keeps its own
    static ENGINE: RefCell<Option<(TesseractConfig, LepTess)>> = const { RefCell::new(None) };
}

/// Tesseract-backed recognizer.
///
/// The value itself only holds configuration and can be shared freely; the
/// engine is created lazily once per thread that uses it.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    config: TesseractConfig,
}

impl TesseractRecognizer {
    /// Check that the language data loads, then return the recognizer.
    pub fn new(config: TesseractConfig) -> Result<Self, RecognizerError> {
        open_engine(&config)?;
        Ok(Self { config })
    }
}

fn open_engine(config: &TesseractConfig) -> Result<LepTess, RecognizerError> {
    let mut engine = LepTess::new(config.datapath.as_deref(), &config.language).map_err(|e| {
        RecognizerError::Init(format!(
            "failed to initialize Tesseract with language '{}': {e}",
            config.language
        ))
    })?;
    engine
        .set_variable(
            Variable::TesseditPagesegMode,
            &config.page_segmentation_mode.to_string(),
        )
        .map_err(|e| RecognizerError::Init(format!("failed to set page segmentation mode: {e}")))?;
    Ok(engine)
}

impl Recognizer for TesseractRecognizer {
    fn recognize(
        &self,
        image: &DynamicImage,
        allowlist: Option<&str>,
    ) -> Result<Vec<String>, RecognizerError> {
        let png = encode_png(image)?;
        ENGINE.with(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.as_ref().is_none_or(|(cfg, _)| *cfg != self.config) {
                debug!(
                    language = %self.config.language,
                    "creating Tesseract engine for this thread"
                );
                *slot = Some((self.config.clone(), open_engine(&self.config)?));
            }
            let Some((_, engine)) = slot.as_mut() else {
                return Err(RecognizerError::Init("engine slot empty".into()));
            };

            engine
                .set_variable(Variable::TesseditCharWhitelist, allowlist.unwrap_or(""))
                .map_err(|e| {
                    RecognizerError::Recognition(format!("failed to set allowlist: {e}"))
                })?;
            engine
                .set_image_from_mem(&png)
                .map_err(|e| RecognizerError::Recognition(format!("failed to load image: {e}")))?;
            let text = engine
                .get_utf8_text()
                .map_err(|e| {
                    RecognizerError::Recognition(format!("invalid UTF-8 from Tesseract: {e}"))
                })?;

            Ok(text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect())
        })
    }
}
