//! Error types for the `turnstills` crate.
//!
//! [`ExtractError`] is returned by every fallible operation. Only
//! configuration problems (a missing source directory, an invalid target
//! list) stop a batch; everything else is recorded per video or per target
//! in the [`BatchReport`](crate::BatchReport).

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `turnstills` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// The source directory does not exist or is not a directory.
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A video file could not be opened for decoding.
    #[error("Failed to open video file at {}: {reason}", path.display())]
    FileOpen {
        /// Path that was passed to [`crate::MediaFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A video's file name does not yield a usable output folder name.
    #[error("Cannot derive an output folder name from {}", .0.display())]
    UnusableFileName(PathBuf),

    /// The opened file has no video stream to decode from.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The requested frame number is past the end of the video.
    #[error("Frame {frame_number} is out of range (video has {total_frames} frames)")]
    FrameOutOfRange {
        /// The frame number that was requested.
        frame_number: u64,
        /// The total number of frames in the video.
        total_frames: u64,
    },

    /// An extraction target is malformed.
    #[error("Invalid extraction target: {0}")]
    InvalidTarget(String),

    /// The extraction configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading directories or writing images.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for ExtractError {
    fn from(error: FfmpegError) -> Self {
        ExtractError::FfmpegError(error.to_string())
    }
}
