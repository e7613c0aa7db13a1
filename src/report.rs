//! Per-target, per-video and per-batch results.
//!
//! Every target attempt produces a [`TargetOutcome`]; nothing is reported
//! only through console output. The binary prints from these values and can
//! dump the whole [`BatchReport`] as JSON.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde_json::{Value, json};

use crate::{error::ExtractError, metadata::VideoMetadata, target::Target};

/// Result of one target attempt.
#[derive(Debug)]
pub enum TargetOutcome {
    /// The frame was decoded and written.
    Saved {
        /// Path of the written JPEG.
        path: PathBuf,
    },
    /// The output already existed and the skip-existing policy is active.
    Skipped {
        /// Path of the existing file.
        path: PathBuf,
    },
    /// The frame could not be decoded or written.
    Failed {
        /// Why the attempt failed.
        error: ExtractError,
    },
}

impl TargetOutcome {
    /// Output path, unless the attempt failed.
    pub fn path(&self) -> Option<&Path> {
        match self {
            TargetOutcome::Saved { path } | TargetOutcome::Skipped { path } => {
                Some(path.as_path())
            }
            TargetOutcome::Failed { .. } => None,
        }
    }

    fn status(&self) -> &'static str {
        match self {
            TargetOutcome::Saved { .. } => "saved",
            TargetOutcome::Skipped { .. } => "skipped",
            TargetOutcome::Failed { .. } => "failed",
        }
    }
}

/// One target attempt on one video.
#[derive(Debug)]
pub struct TargetReport {
    /// The target that was attempted.
    pub target: Target,
    /// Frame index computed for the target.
    pub frame_index: u64,
    /// What happened.
    pub outcome: TargetOutcome,
}

impl TargetReport {
    fn to_json(&self) -> Value {
        let error = match &self.outcome {
            TargetOutcome::Failed { error } => Some(error.to_string()),
            _ => None,
        };
        json!({
            "label": self.target.label(),
            "fraction": self.target.fraction(),
            "frame_index": self.frame_index,
            "status": self.outcome.status(),
            "path": self.outcome.path().map(|path| path.display().to_string()),
            "error": error,
        })
    }
}

/// Everything that happened to one video.
#[derive(Debug)]
pub struct VideoReport {
    /// The source video.
    pub source: PathBuf,
    /// File name without directory and extension.
    pub base_name: String,
    /// `output_root/base_name`.
    pub output_folder: PathBuf,
    /// Metadata, if the video opened.
    pub metadata: Option<VideoMetadata>,
    /// Why the video could not be processed at all, if it could not.
    pub error: Option<ExtractError>,
    /// One entry per attempted target, in target order.
    pub targets: Vec<TargetReport>,
}

impl VideoReport {
    /// Whether the decoding session was opened.
    pub fn opened(&self) -> bool {
        self.metadata.is_some()
    }

    /// Number of stills written.
    pub fn saved_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TargetOutcome::Saved { .. }))
    }

    /// Number of targets skipped because the file existed.
    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TargetOutcome::Skipped { .. }))
    }

    /// Number of targets that failed.
    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TargetOutcome::Failed { .. }))
    }

    /// Paths of the stills written for this video.
    pub fn saved_paths(&self) -> impl Iterator<Item = &Path> {
        self.targets.iter().filter_map(|report| match &report.outcome {
            TargetOutcome::Saved { path } => Some(path.as_path()),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&TargetOutcome) -> bool) -> usize {
        self.targets
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }

    fn to_json(&self) -> Value {
        let targets: Vec<Value> = self.targets.iter().map(TargetReport::to_json).collect();
        json!({
            "source": self.source.display().to_string(),
            "base_name": self.base_name,
            "output_folder": self.output_folder.display().to_string(),
            "frame_count": self.metadata.as_ref().map(|metadata| metadata.frame_count),
            "fps": self.metadata.as_ref().map(|metadata| metadata.frames_per_second),
            "error": self.error.as_ref().map(ToString::to_string),
            "targets": targets,
        })
    }
}

/// The outcome of a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Whether the output root had to be created.
    pub output_root_created: bool,
    /// One report per discovered video, in processing order.
    pub videos: Vec<VideoReport>,
}

impl BatchReport {
    /// Aggregate counts.
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            videos: self.videos.len(),
            ..BatchSummary::default()
        };
        for video in &self.videos {
            if video.opened() {
                summary.opened += 1;
            } else {
                summary.unopened += 1;
            }
            summary.saved += video.saved_count();
            summary.skipped += video.skipped_count();
            summary.failed += video.failed_count();
        }
        summary
    }

    /// The report as a JSON document.
    pub fn to_json(&self) -> Value {
        let summary = self.summary();
        let videos: Vec<Value> = self.videos.iter().map(VideoReport::to_json).collect();
        json!({
            "output_root_created": self.output_root_created,
            "summary": {
                "videos": summary.videos,
                "opened": summary.opened,
                "unopened": summary.unopened,
                "saved": summary.saved,
                "skipped": summary.skipped,
                "failed": summary.failed,
            },
            "videos": videos,
        })
    }
}

/// Counts across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Videos discovered.
    pub videos: usize,
    /// Videos that opened.
    pub opened: usize,
    /// Videos that could not be processed.
    pub unopened: usize,
    /// Stills written.
    pub saved: usize,
    /// Stills left in place.
    pub skipped: usize,
    /// Target attempts that failed.
    pub failed: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} video(s), {} could not be opened; {} frame(s) saved, {} skipped, {} failed",
            self.videos, self.unopened, self.saved, self.skipped, self.failed
        )
    }
}
