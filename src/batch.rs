//! Parallel extraction over many images.

use crate::config::{self, PipelineConfig};
use crate::error::ExtractError;
use crate::models::ExtractionResult;
use crate::pipeline;
use crate::recognizer::Recognizer;
use image::DynamicImage;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Shared stop signal, checked before each image starts.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask running batches to skip images not yet started.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Worker count: available parallelism, capped by the config or
/// `CAPCODE_MAX_WORKERS`.
pub fn worker_count(config: &PipelineConfig) -> usize {
    let available = std::thread::available_parallelism().map_or(1, |n| n.get());
    match config.max_workers.or_else(config::max_workers_override) {
        Some(cap) => available.min(cap).max(1),
        None => available,
    }
}

/// Extract from every image, results in input order.
///
/// One image failing never affects the others. Images not started when
/// `cancel` is set report [`ExtractError::Cancelled`].
pub fn extract_batch<R: Recognizer + ?Sized>(
    images: &[DynamicImage],
    config: &PipelineConfig,
    recognizer: &R,
    cancel: &CancelFlag,
) -> Vec<Result<ExtractionResult, ExtractError>> {
    let workers = worker_count(config);
    debug!(images = images.len(), workers, "starting batch");

    let job = || -> Vec<Result<ExtractionResult, ExtractError>> {
        images
            .par_iter()
            .enumerate()
            .map(|(index, image)| {
                if cancel.is_cancelled() {
                    return Err(ExtractError::Cancelled);
                }
                let result = pipeline::run(image, config, recognizer);
                if let Err(err) = &result {
                    warn!(index, error = %err, "extraction failed");
                }
                result
            })
            .collect()
    };

    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(job),
        Err(err) => {
            warn!(error = %err, "could not build batch pool, using the global pool");
            job()
        }
    }
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Exact matches
    pub exact: usize,
    /// Best guesses
    pub best_guess: usize,
    /// Nothing plausible found
    pub not_found: usize,
    /// Errors, including cancelled images
    pub failed: usize,
}

impl BatchSummary {
    /// Tally a batch's results.
    pub fn from_results(results: &[Result<ExtractionResult, ExtractError>]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result {
                Ok(ExtractionResult::Exact { .. }) => summary.exact += 1,
                Ok(ExtractionResult::BestGuess { .. }) => summary.best_guess += 1,
                Ok(ExtractionResult::NotFound) => summary.not_found += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Number of images tallied
    pub fn total(&self) -> usize {
        self.exact + self.best_guess + self.not_found + self.failed
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images: {} exact, {} best guess, {} not found, {} failed",
            self.total(),
            self.exact,
            self.best_guess,
            self.not_found,
            self.failed
        )
    }
}
