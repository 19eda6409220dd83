//! Orientation sweep and two-phase selection.
//!
//! The preprocessed image is read at 0, 90, 180 and 270 degrees clockwise.
//! Each orientation's tokens become candidates in sweep order; the first
//! candidate that satisfies the rule wins outright, and only when none does
//! is the ranker consulted.

use crate::config::PipelineConfig;
use crate::error::ExtractError;
use crate::matcher::{Correction, NormalizeStrategy, first_valid, normalize, rank};
use crate::models::{Candidate, CodeRule, ExtractionResult, Orientation, OrientationResult};
use crate::preprocess::preprocess;
use crate::recognizer::{CODE_ALPHABET, Recognizer};
use crate::utils::geometry::rotate_expand;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How the sweep reads each orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepOptions {
    /// Stop after the first orientation that yields an exact match
    pub short_circuit: bool,
    /// Colour for pixels exposed by rotation
    pub fill: [u8; 3],
    /// Characters the recognizer is asked to restrict itself to
    pub allowlist: Option<String>,
    /// Candidate generators
    pub strategy: NormalizeStrategy,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            short_circuit: true,
            fill: [255, 255, 255],
            allowlist: Some(CODE_ALPHABET.to_string()),
            strategy: NormalizeStrategy::default(),
        }
    }
}

/// Everything the sweep observed, in sweep order.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Raw tokens per orientation actually read
    pub orientations: Vec<OrientationResult>,
    /// Candidates in orientation order, then generation order
    pub candidates: Vec<Candidate>,
}

/// Read `image` at each orientation and collect candidates.
pub fn sweep_candidates<R: Recognizer + ?Sized>(
    image: &DynamicImage,
    recognizer: &R,
    rule: &CodeRule,
    correction: Option<&Correction>,
    options: &SweepOptions,
) -> Result<SweepReport, ExtractError> {
    let mut report = SweepReport::default();

    for orientation in Orientation::ALL {
        let angle = orientation.degrees();
        let rotated = rotate_expand(image, f32::from(angle), options.fill);
        let tokens = recognizer
            .recognize(&rotated, options.allowlist.as_deref())
            .map_err(|source| ExtractError::Recognizer { angle, source })?;

        let mut found = normalize(&tokens, rule.length(), orientation, options.strategy);
        if let Some(correction) = correction {
            found = correction.apply(found, rule);
        }
        let exact = first_valid(&found, rule).is_some();
        debug!(angle, tokens = tokens.len(), candidates = found.len(), exact, "orientation read");

        report.orientations.push(OrientationResult { orientation, tokens });
        report.candidates.extend(found);

        if exact && options.short_circuit {
            break;
        }
    }

    Ok(report)
}

/// Raw recognizer output per orientation.
///
/// With `short_circuit` set, orientations after the first exact match are
/// not read.
pub fn sweep<R: Recognizer + ?Sized>(
    image: &DynamicImage,
    recognizer: &R,
    rule: &CodeRule,
    options: &SweepOptions,
) -> Result<Vec<OrientationResult>, ExtractError> {
    sweep_candidates(image, recognizer, rule, None, options).map(|report| report.orientations)
}

/// Exact match first, then the ranker's best guess, then nothing.
pub fn select(candidates: Vec<Candidate>, rule: &CodeRule) -> ExtractionResult {
    if let Some(hit) = first_valid(&candidates, rule) {
        return ExtractionResult::Exact {
            code: hit.text().to_string(),
            orientation: hit.orientation(),
        };
    }
    match rank(candidates, rule) {
        Some(guess) => ExtractionResult::BestGuess {
            orientation: guess.orientation(),
            code: guess.into_text(),
        },
        None => ExtractionResult::NotFound,
    }
}

/// Full extraction: preprocess, sweep, select.
pub fn run<R: Recognizer + ?Sized>(
    image: &DynamicImage,
    config: &PipelineConfig,
    recognizer: &R,
) -> Result<ExtractionResult, ExtractError> {
    let prepared = preprocess(image, &config.preprocess)?;
    let report = sweep_candidates(
        &prepared,
        recognizer,
        &config.rule,
        config.correction.as_ref(),
        &config.sweep,
    )?;
    let read = report.orientations.len();
    let result = select(report.candidates, &config.rule);

    match &result {
        ExtractionResult::Exact { code, orientation } => {
            info!(%code, %orientation, orientations_read = read, "exact match");
        }
        ExtractionResult::BestGuess { code, orientation } => {
            info!(%code, %orientation, orientations_read = read, "best guess");
        }
        ExtractionResult::NotFound => info!(orientations_read = read, "no code found"),
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecognizerError;
    use crate::models::CandidateSource;
    use image::{GenericImageView, GrayImage};
    use std::sync::Mutex;

    /// Returns a fixed token list per call, recording the image sizes it saw.
    struct Script {
        replies: Vec<Vec<&'static str>>,
        seen: Mutex<Vec<(u32, u32)>>,
    }

    impl Script {
        fn new(replies: Vec<Vec<&'static str>>) -> Self {
            Self {
                replies,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Recognizer for Script {
        fn recognize(
            &self,
            image: &DynamicImage,
            _allowlist: Option<&str>,
        ) -> Result<Vec<String>, RecognizerError> {
            let mut seen = self.seen.lock().unwrap();
            let reply = self.replies.get(seen.len()).cloned().unwrap_or_default();
            seen.push(image.dimensions());
            Ok(reply.into_iter().map(str::to_string).collect())
        }
    }

    fn wide() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 20, image::Luma([200])))
    }

    #[test]
    fn test_sweep_rotates_clockwise_in_order() {
        let script = Script::new(vec![]);
        let options = SweepOptions {
            short_circuit: false,
            ..SweepOptions::default()
        };
        let results = sweep(&wide(), &script, &CodeRule::default(), &options).unwrap();
        let angles: Vec<u16> = results.iter().map(|r| r.orientation.degrees()).collect();
        assert_eq!(angles, vec![0, 90, 180, 270]);
        assert_eq!(
            *script.seen.lock().unwrap(),
            vec![(40, 20), (20, 40), (40, 20), (20, 40)]
        );
    }

    #[test]
    fn test_short_circuit_stops_after_exact() {
        let script = Script::new(vec![vec!["noise"], vec!["KRATINGAB"], vec!["ZZZZZZZZZ"]]);
        let report = sweep_candidates(
            &wide(),
            &script,
            &CodeRule::default(),
            None,
            &SweepOptions::default(),
        )
        .unwrap();
        assert_eq!(script.calls(), 2);
        assert_eq!(report.orientations.len(), 2);
    }

    #[test]
    fn test_first_orientation_wins_exact_ties() {
        let script = Script::new(vec![vec![], vec!["AAAAAAAAA"], vec!["BBBBBBBBB"]]);
        let options = SweepOptions {
            short_circuit: false,
            ..SweepOptions::default()
        };
        let rule = CodeRule::default();
        let report = sweep_candidates(&wide(), &script, &rule, None, &options).unwrap();
        assert_eq!(script.calls(), 4);
        let result = select(report.candidates, &rule);
        assert_eq!(
            result,
            ExtractionResult::Exact {
                code: "AAAAAAAAA".into(),
                orientation: Orientation::Deg90
            }
        );
    }

    #[test]
    fn test_exact_beats_earlier_near_miss() {
        let rule = CodeRule::default();
        let candidates = vec![
            Candidate::from_clean("ABCDEFGH".into(), Orientation::Deg0, CandidateSource::Token(0)),
            Candidate::from_clean(
                "ABCDEFGHI".into(),
                Orientation::Deg270,
                CandidateSource::Token(0),
            ),
        ];
        assert!(select(candidates, &rule).is_exact());
    }

    #[test]
    fn test_recognizer_failure_carries_angle() {
        let failing = |image: &DynamicImage| {
            if image.dimensions() == (20, 40) {
                Err(RecognizerError::Recognition("engine crashed".into()))
            } else {
                Ok(Vec::<String>::new())
            }
        };
        let err = sweep(&wide(), &failing, &CodeRule::default(), &SweepOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::Recognizer { angle: 90, .. }));
    }

    #[test]
    fn test_run_reports_best_guess() {
        let script = Script::new(vec![vec!["KRAT", "ING"], vec![], vec![], vec![]]);
        let config = PipelineConfig::default();
        let result = run(&wide(), &config, &script).unwrap();
        assert_eq!(
            result,
            ExtractionResult::BestGuess {
                code: "KRATING".into(),
                orientation: Orientation::Deg0
            }
        );
    }
}
