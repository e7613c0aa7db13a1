//! Batch driver.
//!
//! [`BatchExtractor`] scans the source directory, prepares the output root
//! and runs the per-video extractor over every discovered file, one at a
//! time.

use std::{fmt, sync::Arc};

use crate::{
    config::ExtractionConfig,
    error::ExtractError,
    extractor,
    progress::{ExtractionEvent, NoOpProgress, ProgressCallback, ProgressTracker},
    report::BatchReport,
    scanner,
    source::{FfmpegOpener, SourceOpener},
};

/// Runs a whole batch.
///
/// # Example
///
/// ```no_run
/// use turnstills::{BatchExtractor, ExtractionConfig};
///
/// let report = BatchExtractor::new(ExtractionConfig::new("videos", "stills")).run()?;
/// println!("{}", report.summary());
/// # Ok::<(), turnstills::ExtractError>(())
/// ```
pub struct BatchExtractor {
    config: ExtractionConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl fmt::Debug for BatchExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BatchExtractor {
    /// Create a batch with no observer.
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Attach an observer for events and progress.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// The batch configuration.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run the batch, decoding with FFmpeg.
    ///
    /// # Errors
    ///
    /// See [`run_with_opener`](BatchExtractor::run_with_opener).
    pub fn run(&self) -> Result<BatchReport, ExtractError> {
        self.run_with_opener(&mut FfmpegOpener)
    }

    /// Run the batch, opening videos through `opener`.
    ///
    /// Only configuration problems are returned as errors: an invalid target
    /// list, a missing source directory (checked before anything is
    /// created), or an output root that cannot be created. Per-video and
    /// per-target failures are recorded in the returned report.
    pub fn run_with_opener<O: SourceOpener>(
        &self,
        opener: &mut O,
    ) -> Result<BatchReport, ExtractError> {
        let config = &self.config;
        config.validate()?;

        let videos = scanner::scan_videos(config.source_dir(), config.extension())?;

        let mut tracker = ProgressTracker::new(self.progress.clone(), videos.len() as u64);
        let mut report = BatchReport {
            output_root_created: scanner::prepare_output_root(config.output_dir())?,
            videos: Vec::with_capacity(videos.len()),
        };

        if report.output_root_created {
            tracker.event(&ExtractionEvent::OutputDirectoryCreated {
                path: config.output_dir(),
            });
        }
        tracker.event(&ExtractionEvent::VideosFound {
            count: videos.len(),
        });
        log::info!(
            "Extracting {} target(s) from {} video(s) in {}",
            config.targets().len(),
            videos.len(),
            config.source_dir().display()
        );

        for (index, video_path) in videos.iter().enumerate() {
            tracker.event(&ExtractionEvent::VideoStarted {
                path: video_path,
                index,
            });

            let video_report = extractor::extract_video(
                opener,
                video_path,
                config.output_dir(),
                config,
                &tracker,
            );
            tracker.event(&ExtractionEvent::VideoFinished {
                report: &video_report,
            });
            report.videos.push(video_report);
            tracker.advance();
        }

        log::info!("Batch finished: {}", report.summary());
        tracker.event(&ExtractionEvent::Complete { report: &report });
        Ok(report)
    }
}
