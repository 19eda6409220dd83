//! Pipeline configuration and environment overrides.

use crate::error::ConfigError;
use crate::matcher::Correction;
use crate::models::CodeRule;
use crate::pipeline::SweepOptions;
use crate::preprocess::PreprocessConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

fn parse_env_usize(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
}

fn parse_env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

static MAX_WORKERS: OnceLock<Option<usize>> = OnceLock::new();

/// Batch worker cap from `CAPCODE_MAX_WORKERS` (`0` or unset means no cap).
pub fn max_workers_override() -> Option<usize> {
    *MAX_WORKERS.get_or_init(|| parse_env_usize("CAPCODE_MAX_WORKERS").filter(|&n| n > 0))
}

static MAX_DIM: OnceLock<Option<u32>> = OnceLock::new();

/// Longest side allowed when loading images from disk (`CAPCODE_MAX_DIM`).
pub fn max_dim() -> Option<u32> {
    *MAX_DIM.get_or_init(|| {
        parse_env_usize("CAPCODE_MAX_DIM")
            .filter(|&n| n > 0)
            .and_then(|n| u32::try_from(n).ok())
    })
}

static VISION_API_KEY: OnceLock<Option<String>> = OnceLock::new();

/// API key for the remote vision model.
pub fn vision_api_key() -> Option<&'static str> {
    VISION_API_KEY
        .get_or_init(|| parse_env_string("CAPCODE_VISION_API_KEY"))
        .as_deref()
}

static VISION_MODEL: OnceLock<String> = OnceLock::new();

/// Remote vision model name.
pub fn vision_model() -> &'static str {
    VISION_MODEL.get_or_init(|| {
        parse_env_string("CAPCODE_VISION_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string())
    })
}

static VISION_ENDPOINT: OnceLock<String> = OnceLock::new();

/// Base URL of the OpenAI-compatible API.
pub fn vision_endpoint() -> &'static str {
    VISION_ENDPOINT.get_or_init(|| {
        parse_env_string("CAPCODE_VISION_ENDPOINT")
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
    })
}

/// Everything one extraction run needs.
///
/// Missing JSON fields fall back to [`PipelineConfig::default`]: the
/// standard preset, a 9-character code with no digit rule, short-circuiting
/// sweep and no character correction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Preprocessing stages
    pub preprocess: PreprocessConfig,
    /// Code shape
    pub rule: CodeRule,
    /// Orientation sweep behaviour
    pub sweep: SweepOptions,
    /// Substitution hook, off when `None`
    pub correction: Option<Correction>,
    /// Batch worker cap; `CAPCODE_MAX_WORKERS` applies when unset
    pub max_workers: Option<usize>,
}

impl PipelineConfig {
    /// Config with the given preprocessing and rule, defaults elsewhere.
    pub fn new(preprocess: PreprocessConfig, rule: CodeRule) -> Self {
        Self {
            preprocess,
            rule,
            ..Self::default()
        }
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.preprocess.validate()?;
        self.rule.validate()?;
        if self.max_workers == Some(0) {
            return Err(ConfigError::InvalidRule("max_workers must be at least 1".into()));
        }
        Ok(())
    }
}
