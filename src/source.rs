//! Decoder abstraction used by the extraction pipeline.
//!
//! The extractor only needs three things from a video: its metadata, a way
//! to decode the frame at an index, and a way to open one from a path.
//! [`MediaFile`] provides them through FFmpeg; tests and embedders can plug
//! in their own implementation.

use std::path::Path;

use image::DynamicImage;

use crate::{error::ExtractError, media::MediaFile, metadata::VideoMetadata};

/// An open decoding session for one video.
///
/// Dropping the value releases the session.
pub trait FrameSource {
    /// Metadata read when the session was opened.
    fn metadata(&self) -> &VideoMetadata;

    /// Seek to `frame_number` (0-indexed) and decode one frame there.
    fn frame(&mut self, frame_number: u64) -> Result<DynamicImage, ExtractError>;
}

/// Opens [`FrameSource`]s from file paths.
pub trait SourceOpener {
    /// The session type produced by this opener.
    type Source: FrameSource;

    /// Open `path` for decoding.
    fn open(&mut self, path: &Path) -> Result<Self::Source, ExtractError>;
}

/// The default opener, backed by FFmpeg through [`MediaFile::open`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegOpener;

impl SourceOpener for FfmpegOpener {
    type Source = MediaFile;

    fn open(&mut self, path: &Path) -> Result<MediaFile, ExtractError> {
        MediaFile::open(path)
    }
}
