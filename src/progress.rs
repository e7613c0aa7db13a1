//! Batch progress and event reporting.
//!
//! The library never prints. A batch reports what it is doing through a
//! [`ProgressCallback`]: discrete [`ExtractionEvent`]s as they happen, and a
//! [`ProgressInfo`] snapshot after each video. The `turnstills` binary turns
//! these into its console lines and progress bar.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use turnstills::{
//!     BatchExtractor, ExtractionConfig, ExtractionEvent, ProgressCallback, ProgressInfo,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_event(&self, event: &ExtractionEvent<'_>) {
//!         if let ExtractionEvent::VideoStarted { path, .. } = event {
//!             println!("Processing: {}", path.display());
//!         }
//!     }
//!
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{}/{} videos", info.current, info.total);
//!     }
//! }
//!
//! let config = ExtractionConfig::new("videos", "stills");
//! let report = BatchExtractor::new(config)
//!     .with_progress(Arc::new(PrintProgress))
//!     .run()?;
//! # Ok::<(), turnstills::ExtractError>(())
//! ```

use std::{
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    error::ExtractError,
    report::{BatchReport, TargetReport, VideoReport},
};

/// Something that happened during a batch, in the order it happened.
#[derive(Debug)]
#[non_exhaustive]
pub enum ExtractionEvent<'a> {
    /// The output root did not exist and was created.
    OutputDirectoryCreated {
        /// The directory that was created.
        path: &'a Path,
    },
    /// The source directory was scanned.
    VideosFound {
        /// Number of matching files.
        count: usize,
    },
    /// Work on a video is starting.
    VideoStarted {
        /// The video file.
        path: &'a Path,
        /// Zero-based position in the batch.
        index: usize,
    },
    /// The per-video output folder could not be created; the video was not
    /// opened.
    OutputFolderFailed {
        /// The video file.
        video: &'a Path,
        /// Why.
        error: &'a ExtractError,
    },
    /// A video could not be opened; no targets were attempted.
    VideoFailed {
        /// The video file.
        path: &'a Path,
        /// Why.
        error: &'a ExtractError,
    },
    /// One target attempt finished, successfully or not.
    TargetFinished {
        /// The video file.
        video: &'a Path,
        /// The attempt.
        report: &'a TargetReport,
    },
    /// All targets of a video were attempted and its session released.
    VideoFinished {
        /// The video's report.
        report: &'a VideoReport,
    },
    /// The batch finished. Sent even if every extraction failed.
    Complete {
        /// The batch report.
        report: &'a BatchReport,
    },
}

/// A snapshot of batch progress, delivered after each video.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Videos processed so far.
    pub current: u64,
    /// Videos in the batch.
    pub total: u64,
    /// Completion percentage (0.0 – 100.0). `None` for an empty batch.
    pub percentage: Option<f32>,
    /// Wall-clock time since the batch started.
    pub elapsed: Duration,
    /// Estimated time remaining at the current throughput.
    pub estimated_remaining: Option<Duration>,
}

/// Receives events and progress from a batch.
///
/// Both methods default to doing nothing. Implementations must be
/// [`Send`] and [`Sync`] so one observer can be shared through an [`Arc`].
/// They are only ever called from the thread running the batch.
pub trait ProgressCallback: Send + Sync {
    /// Called for every [`ExtractionEvent`].
    fn on_event(&self, _event: &ExtractionEvent<'_>) {}

    /// Called after each video.
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Discards everything. The default observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {}

/// Tracks timing across a batch and emits [`ProgressInfo`] snapshots.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64) -> Self {
        Self {
            callback,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    pub(crate) fn event(&self, event: &ExtractionEvent<'_>) {
        self.callback.on_event(event);
    }

    /// Record one finished video and report.
    pub(crate) fn advance(&mut self) {
        self.current += 1;
        self.callback.on_progress(&self.snapshot());
    }

    fn snapshot(&self) -> ProgressInfo {
        let elapsed = self.start_time.elapsed();

        let percentage = (self.total > 0)
            .then(|| (self.current as f32 / self.total as f32) * 100.0);

        let estimated_remaining = (self.current > 0).then(|| {
            let remaining = self.total.saturating_sub(self.current);
            elapsed.div_f64(self.current as f64).mul_f64(remaining as f64)
        });

        ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
        }
    }
}
