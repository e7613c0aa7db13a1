//! # turnstills
//!
//! Batch-extract labelled still frames from turntable product videos.
//!
//! Every video in a source directory is opened with FFmpeg (via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)), a fixed set of
//! frames is decoded at fractions of its frame count, and each one is written
//! as a JPEG into a folder named after the video:
//!
//! ```text
//! stills/
//! └── ring1/
//!     ├── ring1_left_side.jpg   (0%)
//!     ├── ring1_front.jpg       (25%)
//!     ├── ring1_right_side.jpg  (50%)
//!     └── ring1_back.jpg        (75%)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use turnstills::{BatchExtractor, ExtractionConfig};
//!
//! let config = ExtractionConfig::new("videos", "stills");
//! let report = BatchExtractor::new(config).run()?;
//! for video in &report.videos {
//!     for path in video.saved_paths() {
//!         println!("Saved: {}", path.display());
//!     }
//! }
//! # Ok::<(), turnstills::ExtractError>(())
//! ```
//!
//! ## Failure handling
//!
//! Only configuration problems stop a batch (a missing source directory, an
//! invalid target list). A video that cannot be opened, a frame that cannot
//! be decoded, and an image that cannot be written are recorded in the
//! [`BatchReport`] and the batch carries on.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod batch;
pub mod config;
pub mod error;
mod extractor;
pub mod ffmpeg;
pub mod media;
pub mod metadata;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod source;
pub mod target;
mod utilities;

pub use batch::BatchExtractor;
pub use config::{ExtractionConfig, OverwritePolicy};
pub use error::ExtractError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use media::MediaFile;
pub use metadata::VideoMetadata;
pub use progress::{ExtractionEvent, NoOpProgress, ProgressCallback, ProgressInfo};
pub use report::{BatchReport, BatchSummary, TargetOutcome, TargetReport, VideoReport};
pub use source::{FfmpegOpener, FrameSource, SourceOpener};
pub use target::{Target, default_targets};
