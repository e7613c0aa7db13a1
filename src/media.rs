//! FFmpeg-backed decoding session.
//!
//! [`MediaFile`] opens a video, caches its [`VideoMetadata`], and decodes
//! single frames by index. The demuxer context is owned by the value, so
//! the session is released when it goes out of scope on every path,
//! including early returns and panics inside a caller's loop.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    error::ExtractError, ffmpeg, metadata::VideoMetadata, source::FrameSource, utilities,
};

/// An open video file.
///
/// # Example
///
/// ```no_run
/// use turnstills::{FrameSource, MediaFile};
///
/// let mut media = MediaFile::open("ring1.mp4")?;
/// let middle = media.metadata().frame_count / 2;
/// media.frame(middle)?.save("middle.jpg")?;
/// # Ok::<(), turnstills::ExtractError>(())
/// ```
pub struct MediaFile {
    input_context: Input,
    video_stream_index: usize,
    metadata: VideoMetadata,
    file_path: PathBuf,
}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a video file for frame extraction.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, picks the best
    /// video stream and reads its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::FileOpen`] if the file is missing, is not a
    /// recognised container, has no video stream, or its codec cannot be
    /// decoded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();
        let open_error = |reason: String| ExtractError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        log::debug!("Opening video file: {}", path.display());

        ffmpeg::initialize().map_err(|error| open_error(error.to_string()))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| open_error("no video stream".to_string()))?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| open_error(format!("unreadable codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("unsupported video codec: {error}")))?;

        let frames_per_second = rational_to_f64(stream.avg_frame_rate())
            .or_else(|| rational_to_f64(stream.rate()))
            .unwrap_or(0.0);

        // Prefer the frame count from the stream header; fall back to an
        // estimate from whichever duration the container reports.
        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else if frames_per_second > 0.0 {
            let seconds = if stream.duration() > 0 {
                utilities::pts_to_seconds(stream.duration(), time_base)
            } else if input_context.duration() > 0 {
                input_context.duration() as f64 / f64::from(ffmpeg_sys_next::AV_TIME_BASE)
            } else {
                0.0
            };
            (seconds * frames_per_second) as u64
        } else {
            0
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
        };

        log::debug!(
            "Opened {}: {}x{}, {} frames @ {:.3} fps [{}]",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frame_count,
            metadata.frames_per_second,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            video_stream_index,
            metadata,
            file_path,
        })
    }

    /// Path this session was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Decode the frame at `frame_number`.
    ///
    /// Seeks to the nearest keyframe at or before the target and decodes
    /// forward; the first frame whose position is at or past the target is
    /// returned. Positions count from the stream's first frame, so a
    /// non-zero start PTS does not shift the index. When the frame rate is unknown, positions are counted from
    /// the start of the stream instead of derived from timestamps.
    fn decode_frame(&mut self, frame_number: u64) -> Result<DynamicImage, ExtractError> {
        let total_frames = self.metadata.frame_count;
        if total_frames > 0 && frame_number >= total_frames {
            return Err(ExtractError::FrameOutOfRange {
                frame_number,
                total_frames,
            });
        }

        let video_stream_index = self.video_stream_index;
        let frames_per_second = self.metadata.frames_per_second;
        let width = self.metadata.width;
        let height = self.metadata.height;

        let stream = self
            .input_context
            .stream(video_stream_index)
            .ok_or(ExtractError::NoVideoStream)?;
        let time_base = stream.time_base();
        let start_pts = utilities::stream_start_pts(stream.start_time());
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let seek_timestamp = if frames_per_second > 0.0 {
            utilities::frame_number_to_seek_timestamp(
                frame_number,
                frames_per_second,
                start_pts,
                time_base,
            )
        } else {
            0
        };
        log::trace!(
            "Seeking {} to frame {frame_number} (ts {seek_timestamp})",
            self.file_path.display()
        );
        self.input_context.seek(seek_timestamp, ..seek_timestamp)?;

        let mut position = FramePosition {
            time_base,
            start_pts,
            frames_per_second,
            decoded: 0,
        };
        let mut decoded_frame = VideoFrame::empty();
        let mut rgb_frame = VideoFrame::empty();

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != video_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                if position.next(&decoded_frame) >= frame_number {
                    scaler.run(&decoded_frame, &mut rgb_frame)?;
                    return convert_frame_to_image(&rgb_frame, width, height);
                }
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            if position.next(&decoded_frame) >= frame_number {
                scaler.run(&decoded_frame, &mut rgb_frame)?;
                return convert_frame_to_image(&rgb_frame, width, height);
            }
        }

        Err(ExtractError::VideoDecodeError(format!(
            "stream ended before frame {frame_number}"
        )))
    }
}

impl FrameSource for MediaFile {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn frame(&mut self, frame_number: u64) -> Result<DynamicImage, ExtractError> {
        self.decode_frame(frame_number)
    }
}

impl Drop for MediaFile {
    fn drop(&mut self) {
        log::debug!("Releasing video file: {}", self.file_path.display());
    }
}

/// Tracks the index of each decoded frame after a seek.
struct FramePosition {
    time_base: Rational,
    start_pts: i64,
    frames_per_second: f64,
    decoded: u64,
}

impl FramePosition {
    fn next(&mut self, frame: &VideoFrame) -> u64 {
        let index = if self.frames_per_second > 0.0 {
            let pts = frame.timestamp().or_else(|| frame.pts()).unwrap_or(0);
            utilities::pts_to_frame_number(
                pts,
                self.start_pts,
                self.time_base,
                self.frames_per_second,
            )
        } else {
            self.decoded
        };
        self.decoded += 1;
        index
    }
}

fn rational_to_f64(rational: Rational) -> Option<f64> {
    if rational.numerator() > 0 && rational.denominator() > 0 {
        Some(f64::from(rational.numerator()) / f64::from(rational.denominator()))
    } else {
        None
    }
}

fn convert_frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<DynamicImage, ExtractError> {
    let buffer = utilities::frame_to_rgb_buffer(rgb_frame, width, height);
    let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        ExtractError::VideoDecodeError(
            "decoded frame data does not fill an RGB image".to_string(),
        )
    })?;
    Ok(DynamicImage::ImageRgb8(rgb_image))
}
