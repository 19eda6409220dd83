//! Preprocessing parameters and named presets.

use crate::error::{ConfigError, PreprocessError};
use serde::{Deserialize, Serialize};

/// Fraction of each edge discarded before recognition.
///
/// Cap rims carry embossed material and mould codes; cropping removes
/// them before the recognizer sees them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CropMargins {
    /// Fraction of the width removed on the left
    pub left: f32,
    /// Fraction of the height removed at the top
    pub top: f32,
    /// Fraction of the width removed on the right
    pub right: f32,
    /// Fraction of the height removed at the bottom
    pub bottom: f32,
}

impl CropMargins {
    /// Same fraction on every edge
    pub fn uniform(fraction: f32) -> Self {
        Self {
            left: fraction,
            top: fraction,
            right: fraction,
            bottom: fraction,
        }
    }

    fn is_noop(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0
    }
}

/// Binarization cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Pixels below this luminance become ink
    Fixed(u8),
    /// Cutoff chosen per image by Otsu's method
    Otsu,
}

/// Stroke conditioning strategy. At most one is active per configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conditioning {
    /// Leave strokes untouched
    #[default]
    None,
    /// 3x3 sharpening kernel
    Sharpen,
    /// Unsharp mask
    UnsharpMask {
        /// Blur sigma of the mask
        sigma: f32,
        /// Minimum difference before sharpening applies
        threshold: i32,
    },
    /// Gaussian blur
    GaussianBlur {
        /// Standard deviation in pixels
        sigma: f32,
    },
    /// Hard black/white cutoff
    Binarize {
        /// Cutoff
        threshold: Threshold,
    },
    /// Dilate then erode the dark ink, bridging dotted strokes
    Close {
        /// Structuring element radius
        radius: u8,
    },
    /// Erode then dilate the dark ink, keeping characters apart
    Open {
        /// Structuring element radius
        radius: u8,
    },
}

/// Geometric and photometric preprocessing parameters.
///
/// One value fully determines preprocessing; named presets replace
/// per-variant pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Resize to this width (aspect preserved) before cropping
    pub target_width: Option<u32>,
    /// Edge fractions to discard
    pub crop: CropMargins,
    /// Convert to grayscale
    pub grayscale: bool,
    /// Histogram equalization
    pub equalize: bool,
    /// Global contrast factor (1.0 = unchanged)
    pub contrast: Option<f32>,
    /// Stroke conditioning
    pub conditioning: Conditioning,
    /// Invert light-on-dark to dark-on-light (or vice versa)
    pub invert: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Names accepted by [`PreprocessConfig::preset`]
pub const PRESET_NAMES: [&str; 5] = ["standard", "dot_matrix", "glare", "binarized", "minimal"];

impl PreprocessConfig {
    /// Grayscale, strong contrast, sharpen. Works on most printed caps.
    pub fn standard() -> Self {
        Self {
            target_width: None,
            crop: CropMargins::default(),
            grayscale: true,
            equalize: false,
            contrast: Some(2.5),
            conditioning: Conditioning::Sharpen,
            invert: false,
        }
    }

    /// Dot-matrix print: upscale, drop the rim, bridge broken strokes.
    pub fn dot_matrix() -> Self {
        Self {
            target_width: Some(1000),
            crop: CropMargins::uniform(0.15),
            grayscale: true,
            equalize: false,
            contrast: Some(2.0),
            conditioning: Conditioning::Close { radius: 1 },
            invert: false,
        }
    }

    /// Reflective caps: equalize and invert.
    pub fn glare() -> Self {
        Self {
            target_width: Some(800),
            crop: CropMargins::uniform(0.1),
            grayscale: true,
            equalize: true,
            contrast: None,
            conditioning: Conditioning::UnsharpMask {
                sigma: 2.0,
                threshold: 3,
            },
            invert: true,
        }
    }

    /// Hard black/white with a per-image cutoff.
    pub fn binarized() -> Self {
        Self {
            target_width: Some(800),
            crop: CropMargins::uniform(0.2),
            grayscale: true,
            equalize: false,
            contrast: Some(1.5),
            conditioning: Conditioning::Binarize {
                threshold: Threshold::Otsu,
            },
            invert: false,
        }
    }

    /// Grayscale only.
    pub fn minimal() -> Self {
        Self {
            target_width: None,
            crop: CropMargins::default(),
            grayscale: true,
            equalize: false,
            contrast: None,
            conditioning: Conditioning::None,
            invert: false,
        }
    }

    /// Pass the image through untouched.
    pub fn passthrough() -> Self {
        Self {
            grayscale: false,
            ..Self::minimal()
        }
    }

    /// Look up a named preset.
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "standard" => Ok(Self::standard()),
            "dot_matrix" => Ok(Self::dot_matrix()),
            "glare" => Ok(Self::glare()),
            "binarized" => Ok(Self::binarized()),
            "minimal" => Ok(Self::minimal()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// True if any luminance-only stage is configured.
    pub(crate) fn needs_luma(&self) -> bool {
        self.grayscale
            || self.equalize
            || self.contrast.is_some()
            || self.conditioning != Conditioning::None
    }

    pub(crate) fn crops(&self) -> bool {
        !self.crop.is_noop()
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), PreprocessError> {
        let CropMargins {
            left,
            top,
            right,
            bottom,
        } = self.crop;
        for (name, value) in [("left", left), ("top", top), ("right", right), ("bottom", bottom)] {
            if !(0.0..1.0).contains(&value) {
                return Err(PreprocessError::InvalidParameter(format!(
                    "crop.{name} = {value} is outside [0, 1)"
                )));
            }
        }
        if left + right >= 1.0 || top + bottom >= 1.0 {
            return Err(PreprocessError::InvalidParameter(
                "crop margins remove the whole image".into(),
            ));
        }
        if self.target_width == Some(0) {
            return Err(PreprocessError::InvalidParameter("target_width must be positive".into()));
        }
        if let Some(factor) = self.contrast {
            if !factor.is_finite() || factor < 0.0 {
                return Err(PreprocessError::InvalidParameter(format!(
                    "contrast factor {factor} must be finite and non-negative"
                )));
            }
        }
        match self.conditioning {
            Conditioning::UnsharpMask { sigma, .. } | Conditioning::GaussianBlur { sigma }
                if !(sigma.is_finite() && sigma > 0.0) =>
            {
                Err(PreprocessError::InvalidParameter(format!(
                    "sigma {sigma} must be positive"
                )))
            }
            Conditioning::Close { radius: 0 } | Conditioning::Open { radius: 0 } => Err(
                PreprocessError::InvalidParameter("morphology radius must be at least 1".into()),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for name in PRESET_NAMES {
            let cfg = PreprocessConfig::preset(name).unwrap();
            assert!(cfg.validate().is_ok(), "preset {name} failed validation");
        }
        assert!(PreprocessConfig::preset("nope").is_err());
    }

    #[test]
    fn test_invalid_parameters() {
        let mut cfg = PreprocessConfig::minimal();
        cfg.crop = CropMargins {
            left: 0.6,
            right: 0.5,
            ..CropMargins::default()
        };
        assert!(cfg.validate().is_err());

        let mut cfg = PreprocessConfig::minimal();
        cfg.conditioning = Conditioning::GaussianBlur { sigma: 0.0 };
        assert!(cfg.validate().is_err());

        let mut cfg = PreprocessConfig::minimal();
        cfg.contrast = Some(-1.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_with_defaults() {
        let cfg: PreprocessConfig = serde_json::from_str(
            r#"{"crop": {"left": 0.1, "top": 0.1, "right": 0.1, "bottom": 0.1},
                "conditioning": {"kind": "binarize", "threshold": {"fixed": 140}}}"#,
        )
        .unwrap();
        assert_eq!(cfg.crop, CropMargins::uniform(0.1));
        assert_eq!(
            cfg.conditioning,
            Conditioning::Binarize {
                threshold: Threshold::Fixed(140)
            }
        );
        // Unspecified fields fall back to the standard preset
        assert_eq!(cfg.contrast, Some(2.5));
        assert!(cfg.grayscale);
    }

    #[test]
    fn test_passthrough_needs_nothing() {
        let cfg = PreprocessConfig::passthrough();
        assert!(!cfg.needs_luma());
        assert!(!cfg.crops());
    }
}
