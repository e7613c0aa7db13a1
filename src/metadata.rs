//! Video metadata.
//!
//! [`VideoMetadata`] is read once when a video is opened and cached for the
//! lifetime of the decoding session. Extraction targets are resolved
//! against [`frame_count`](VideoMetadata::frame_count).

use std::time::Duration;

/// Metadata for the video stream of an opened file.
///
/// # Example
///
/// ```no_run
/// use turnstills::{FrameSource, MediaFile};
///
/// let media = MediaFile::open("ring1.mp4")?;
/// let metadata = media.metadata();
/// println!("{} frames @ {:.2} fps", metadata.frame_count, metadata.frames_per_second);
/// # Ok::<(), turnstills::ExtractError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second. Zero when the container does not report a rate.
    pub frames_per_second: f64,
    /// Total number of frames. Taken from the stream header when present,
    /// otherwise estimated from duration and frame rate (zero if neither is
    /// known).
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"hevc"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Duration derived from frame count and frame rate.
    ///
    /// Zero when the frame rate is zero or unavailable; saturates at
    /// [`Duration::MAX`] for implausible headers.
    pub fn duration(&self) -> Duration {
        if self.frames_per_second.is_finite() && self.frames_per_second > 0.0 {
            Duration::try_from_secs_f64(self.frame_count as f64 / self.frames_per_second)
                .unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}
