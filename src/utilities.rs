//! Internal helpers for pixel copying and frame/timestamp arithmetic.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};
use ffmpeg_sys_next::{AV_NOPTS_VALUE, AV_TIME_BASE};

/// Copy an RGB24 frame into a tightly-packed buffer, dropping row padding.
///
/// FFmpeg planes are frequently wider than `width × 3` bytes; the result can
/// be passed straight to [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * (height as usize)].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
    for row in data.chunks(stride).take(height as usize) {
        buffer.extend_from_slice(&row[..row_bytes]);
    }
    buffer
}

/// A stream's first PTS, with an unset start time treated as zero.
pub(crate) fn stream_start_pts(start_time: i64) -> i64 {
    if start_time == AV_NOPTS_VALUE {
        0
    } else {
        start_time
    }
}

/// Convert a frame index to a container seek timestamp in `AV_TIME_BASE`
/// units, offset by the stream's start PTS.
///
/// `Input::seek` goes through `avformat_seek_file` with no stream index, so
/// it expects microseconds rather than the stream's own time base.
pub(crate) fn frame_number_to_seek_timestamp(
    frame_number: u64,
    frames_per_second: f64,
    start_pts: i64,
    time_base: Rational,
) -> i64 {
    let seconds = frame_number as f64 / frames_per_second + pts_to_seconds(start_pts, time_base);
    (seconds * f64::from(AV_TIME_BASE)) as i64
}

/// Rescale a PTS value from the stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
}

/// Rescale a PTS value to a frame index counted from the stream's first
/// frame. Timestamps before `start_pts` map to 0.
pub(crate) fn pts_to_frame_number(
    pts: i64,
    start_pts: i64,
    time_base: Rational,
    frames_per_second: f64,
) -> u64 {
    let seconds = pts_to_seconds(pts.saturating_sub(start_pts), time_base);
    // Rounded so that PTS values landing a hair below a frame boundary
    // (e.g. 1001/30000 time bases) still map to that frame.
    (seconds * frames_per_second).round() as u64
}
