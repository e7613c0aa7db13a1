//! Per-video extraction.
//!
//! [`extract_video`] runs every target against one video and returns a
//! [`VideoReport`]. Failures never escape: a video that cannot be opened and
//! a target that cannot be decoded or written are both recorded and the
//! caller moves on.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::{
    config::{ExtractionConfig, OverwritePolicy},
    error::ExtractError,
    progress::{ExtractionEvent, ProgressTracker},
    report::{TargetOutcome, TargetReport, VideoReport},
    scanner,
    source::{FrameSource, SourceOpener},
    target::Target,
};

/// Extract every configured target from one video.
///
/// Steps, in order:
/// 1. create `output_root/<base_name>` (before opening, so a video that
///    fails to open still leaves its empty folder behind). A base name of
///    `""`, `.` or `..` is a per-video error and nothing is created;
/// 2. open the video through `opener`;
/// 3. for each target, compute the frame index, decode and write
///    `<base_name>_<label>.jpg`;
/// 4. release the session.
pub(crate) fn extract_video<O: SourceOpener>(
    opener: &mut O,
    video_path: &Path,
    output_root: &Path,
    config: &ExtractionConfig,
    tracker: &ProgressTracker,
) -> VideoReport {
    let base_name = scanner::base_name(video_path);
    let output_folder = output_root.join(&base_name);

    let mut report = VideoReport {
        source: video_path.to_path_buf(),
        base_name,
        output_folder,
        metadata: None,
        error: None,
        targets: Vec::with_capacity(config.targets().len()),
    };

    if let Err(error) = create_output_folder(&report) {
        log::debug!("No output folder for {}: {error}", video_path.display());
        tracker.event(&ExtractionEvent::OutputFolderFailed {
            video: video_path,
            error: &error,
        });
        report.error = Some(error);
        return report;
    }

    let mut source = match opener.open(video_path) {
        Ok(source) => source,
        Err(error) => {
            log::debug!("Skipping {}: {error}", video_path.display());
            tracker.event(&ExtractionEvent::VideoFailed {
                path: video_path,
                error: &error,
            });
            report.error = Some(error);
            return report;
        }
    };

    let metadata = source.metadata().clone();
    log::debug!(
        "{}: {} frames, {:.3} fps, duration {:?}",
        video_path.display(),
        metadata.frame_count,
        metadata.frames_per_second,
        metadata.duration(),
    );

    for target in config.targets() {
        let frame_index = target.frame_index(metadata.frame_count);
        let outcome = extract_target(&mut source, target, frame_index, &report, config);

        if let TargetOutcome::Failed { error } = &outcome {
            log::debug!(
                "{} at frame {frame_index} of {}: {error}",
                target.label(),
                video_path.display()
            );
        }

        report.targets.push(TargetReport {
            target: target.clone(),
            frame_index,
            outcome,
        });
        if let Some(finished) = report.targets.last() {
            tracker.event(&ExtractionEvent::TargetFinished {
                video: video_path,
                report: finished,
            });
        }
    }

    drop(source);
    report.metadata = Some(metadata);
    report
}

/// Create `output_root/<base_name>`, refusing names that would resolve
/// outside the output root.
fn create_output_folder(report: &VideoReport) -> Result<(), ExtractError> {
    if matches!(report.base_name.as_str(), "" | "." | "..") {
        return Err(ExtractError::UnusableFileName(report.source.clone()));
    }
    fs::create_dir_all(&report.output_folder)?;
    Ok(())
}

fn extract_target<S: FrameSource>(
    source: &mut S,
    target: &Target,
    frame_index: u64,
    report: &VideoReport,
    config: &ExtractionConfig,
) -> TargetOutcome {
    let path = report.output_folder.join(target.file_name(&report.base_name));

    if config.overwrite_policy() == OverwritePolicy::SkipExisting && path.exists() {
        return TargetOutcome::Skipped { path };
    }

    let written = source
        .frame(frame_index)
        .and_then(|image| write_jpeg(&image, &path, config.jpeg_quality()));

    match written {
        Ok(()) => TargetOutcome::Saved { path },
        Err(error) => TargetOutcome::Failed { error },
    }
}

/// Encode `image` as JPEG at `path`, replacing any existing file.
pub(crate) fn write_jpeg(
    image: &DynamicImage,
    path: &Path,
    quality: u8,
) -> Result<(), ExtractError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    image.to_rgb8().write_with_encoder(encoder)?;
    writer.flush()?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}
