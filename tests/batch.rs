//! Batch pipeline integration tests.
//!
//! These run the full scan → extract → write pipeline against an in-memory
//! frame source, so they do not need FFmpeg fixtures.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use image::{DynamicImage, Rgb, RgbImage};
use turnstills::{
    BatchExtractor, ExtractError, ExtractionConfig, ExtractionEvent, FrameSource,
    OverwritePolicy, ProgressCallback, ProgressInfo, SourceOpener, Target, TargetOutcome,
    VideoMetadata,
};

// ── In-memory source ───────────────────────────────────────────────

#[derive(Clone)]
struct FakeVideo {
    frame_count: u64,
    frames_per_second: f64,
    broken_frames: Vec<u64>,
}

impl FakeVideo {
    fn new(frame_count: u64, frames_per_second: f64) -> Self {
        Self {
            frame_count,
            frames_per_second,
            broken_frames: Vec::new(),
        }
    }

    fn with_broken_frame(mut self, frame_number: u64) -> Self {
        self.broken_frames.push(frame_number);
        self
    }
}

#[derive(Default)]
struct Calls {
    opened: Vec<String>,
    requested: Vec<(String, u64)>,
    released: Vec<String>,
}

struct FakeSource {
    name: String,
    metadata: VideoMetadata,
    broken_frames: Vec<u64>,
    calls: Arc<Mutex<Calls>>,
}

impl FrameSource for FakeSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn frame(&mut self, frame_number: u64) -> Result<DynamicImage, ExtractError> {
        self.calls
            .lock()
            .unwrap()
            .requested
            .push((self.name.clone(), frame_number));

        if frame_number >= self.metadata.frame_count || self.broken_frames.contains(&frame_number)
        {
            return Err(ExtractError::VideoDecodeError(format!(
                "no frame at {frame_number}"
            )));
        }

        let shade = (frame_number % 256) as u8;
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            8,
            6,
            Rgb([shade, 128, 255 - shade]),
        )))
    }
}

impl Drop for FakeSource {
    fn drop(&mut self) {
        self.calls.lock().unwrap().released.push(self.name.clone());
    }
}

#[derive(Default)]
struct FakeOpener {
    videos: HashMap<String, FakeVideo>,
    calls: Arc<Mutex<Calls>>,
}

impl FakeOpener {
    fn with_video(mut self, name: &str, video: FakeVideo) -> Self {
        self.videos.insert(name.to_string(), video);
        self
    }
}

impl SourceOpener for FakeOpener {
    type Source = FakeSource;

    fn open(&mut self, path: &Path) -> Result<FakeSource, ExtractError> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let video = self
            .videos
            .get(&name)
            .ok_or_else(|| ExtractError::FileOpen {
                path: path.to_path_buf(),
                reason: "Invalid data found when processing input".to_string(),
            })?
            .clone();

        self.calls.lock().unwrap().opened.push(name.clone());
        Ok(FakeSource {
            name,
            metadata: VideoMetadata {
                width: 8,
                height: 6,
                frames_per_second: video.frames_per_second,
                frame_count: video.frame_count,
                codec: "fake".to_string(),
            },
            broken_frames: video.broken_frames,
            calls: self.calls.clone(),
        })
    }
}

// ── Helpers ────────────────────────────────────────────────────────

struct Workspace {
    _root: tempfile::TempDir,
    source: PathBuf,
    output: PathBuf,
}

fn workspace(files: &[&str]) -> Workspace {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let source = root.path().join("videos");
    let output = root.path().join("stills");
    fs::create_dir(&source).expect("Failed to create source dir");
    for name in files {
        fs::write(source.join(name), b"not really a video").expect("Failed to write file");
    }
    Workspace {
        _root: root,
        source,
        output,
    }
}

fn sorted_dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ── End-to-end ─────────────────────────────────────────────────────

#[test]
fn ring_video_produces_four_labelled_stills() {
    let workspace = workspace(&["ring1.mp4"]);
    let mut opener = FakeOpener::default().with_video("ring1.mp4", FakeVideo::new(100, 25.0));

    let config = ExtractionConfig::new(&workspace.source, &workspace.output);
    let report = BatchExtractor::new(config)
        .run_with_opener(&mut opener)
        .expect("batch should run");

    assert!(report.output_root_created);
    assert_eq!(report.videos.len(), 1);

    let video = &report.videos[0];
    assert_eq!(video.base_name, "ring1");
    assert!(video.error.is_none());
    let metadata = video.metadata.as_ref().expect("video should have opened");
    assert_eq!(metadata.duration().as_secs(), 4);

    let indices: Vec<_> = video.targets.iter().map(|target| target.frame_index).collect();
    assert_eq!(indices, [0, 25, 50, 75]);

    let folder = workspace.output.join("ring1");
    assert_eq!(
        sorted_dir_names(&folder),
        [
            "ring1_back.jpg",
            "ring1_front.jpg",
            "ring1_left_side.jpg",
            "ring1_right_side.jpg",
        ]
    );
    for path in video.saved_paths() {
        let still = image::open(path).expect("still should be a readable JPEG");
        assert_eq!((still.width(), still.height()), (8, 6));
    }

    let calls = opener.calls.lock().unwrap();
    let requested: Vec<_> = calls.requested.iter().map(|(_, index)| *index).collect();
    assert_eq!(requested, [0, 25, 50, 75]);
    assert_eq!(calls.released, ["ring1.mp4"]);
}

#[test]
fn missing_source_directory_stops_before_creating_output() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let source = root.path().join("does_not_exist");
    let output = root.path().join("stills");

    let result = BatchExtractor::new(ExtractionConfig::new(&source, &output))
        .run_with_opener(&mut FakeOpener::default());

    assert!(matches!(result, Err(ExtractError::SourceNotFound(path)) if path == source));
    assert!(!output.exists());
}

#[test]
fn existing_output_root_is_reused() {
    let workspace = workspace(&[]);
    fs::create_dir(&workspace.output).unwrap();

    let report = BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .run_with_opener(&mut FakeOpener::default())
        .unwrap();

    assert!(!report.output_root_created);
    assert!(report.videos.is_empty());
    assert_eq!(report.summary().videos, 0);
}

#[test]
fn only_exact_extension_matches_get_folders() {
    let workspace = workspace(&[
        "a.mp4", "b.mp4", "c.mp4", "notes.txt", "cover.jpg", "UPPER.MP4",
    ]);
    let mut opener = FakeOpener::default()
        .with_video("a.mp4", FakeVideo::new(10, 30.0))
        .with_video("b.mp4", FakeVideo::new(10, 30.0))
        .with_video("c.mp4", FakeVideo::new(10, 30.0));

    let report = BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .run_with_opener(&mut opener)
        .unwrap();

    assert_eq!(report.videos.len(), 3);
    assert_eq!(sorted_dir_names(&workspace.output), ["a", "b", "c"]);
    assert_eq!(opener.calls.lock().unwrap().opened, ["a.mp4", "b.mp4", "c.mp4"]);
}

// ── Failure handling ───────────────────────────────────────────────

#[test]
fn unopenable_video_leaves_empty_folder_and_batch_continues() {
    let workspace = workspace(&["broken.mp4", "good.mp4"]);
    let mut opener = FakeOpener::default().with_video("good.mp4", FakeVideo::new(40, 24.0));

    let report = BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .run_with_opener(&mut opener)
        .unwrap();

    let broken = &report.videos[0];
    assert_eq!(broken.base_name, "broken");
    assert!(!broken.opened());
    assert!(broken.targets.is_empty());
    let error = broken.error.as_ref().expect("open error should be recorded");
    assert!(error.to_string().contains("broken.mp4"));

    let broken_folder = workspace.output.join("broken");
    assert!(broken_folder.is_dir());
    assert!(sorted_dir_names(&broken_folder).is_empty());

    assert_eq!(report.videos[1].saved_count(), 4);

    let summary = report.summary();
    assert_eq!(summary.unopened, 1);
    assert_eq!(summary.saved, 4);
}

#[test]
fn decode_failure_skips_only_that_target() {
    let workspace = workspace(&["ring1.mp4"]);
    let mut opener = FakeOpener::default().with_video(
        "ring1.mp4",
        FakeVideo::new(100, 25.0).with_broken_frame(50),
    );

    let report = BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .run_with_opener(&mut opener)
        .unwrap();

    let video = &report.videos[0];
    assert_eq!(video.saved_count(), 3);
    assert_eq!(video.failed_count(), 1);

    let failed = &video.targets[2];
    assert_eq!(failed.target.label(), "right_side");
    assert!(matches!(
        failed.outcome,
        TargetOutcome::Failed {
            error: ExtractError::VideoDecodeError(_)
        }
    ));
    assert!(!workspace.output.join("ring1/ring1_right_side.jpg").exists());
    assert!(workspace.output.join("ring1/ring1_back.jpg").exists());

    let calls = opener.calls.lock().unwrap();
    assert_eq!(calls.requested.len(), 4);
    assert_eq!(calls.released, ["ring1.mp4"]);
}

#[test]
fn write_failure_is_treated_like_decode_failure() {
    let workspace = workspace(&["ring1.mp4"]);
    // A directory squatting on the output path makes the file unwritable.
    fs::create_dir_all(workspace.output.join("ring1").join("ring1_front.jpg")).unwrap();
    let mut opener = FakeOpener::default().with_video("ring1.mp4", FakeVideo::new(100, 25.0));

    let report = BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .run_with_opener(&mut opener)
        .unwrap();

    let video = &report.videos[0];
    assert!(matches!(
        video.targets[1].outcome,
        TargetOutcome::Failed {
            error: ExtractError::IoError(_)
        }
    ));
    assert_eq!(video.saved_count(), 3);
}

#[test]
fn empty_video_maps_every_target_to_frame_zero() {
    let workspace = workspace(&["empty.mp4"]);
    let mut opener = FakeOpener::default().with_video("empty.mp4", FakeVideo::new(0, 0.0));

    let report = BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .run_with_opener(&mut opener)
        .unwrap();

    let video = &report.videos[0];
    assert!(video.targets.iter().all(|target| target.frame_index == 0));
    assert_eq!(video.failed_count(), 4);
    assert_eq!(video.metadata.as_ref().unwrap().duration().as_secs(), 0);
    assert_eq!(opener.calls.lock().unwrap().released, ["empty.mp4"]);
}

// ── Re-runs ────────────────────────────────────────────────────────

fn saved_or_skipped_paths(report: &turnstills::BatchReport) -> Vec<PathBuf> {
    report
        .videos
        .iter()
        .flat_map(|video| &video.targets)
        .filter_map(|target| target.outcome.path().map(Path::to_path_buf))
        .collect()
}

#[test]
fn rerun_overwrites_with_identical_paths() {
    let workspace = workspace(&["ring1.mp4", "ring2.mp4"]);
    let mut opener = FakeOpener::default()
        .with_video("ring1.mp4", FakeVideo::new(100, 25.0))
        .with_video("ring2.mp4", FakeVideo::new(60, 30.0));
    let extractor =
        BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output));

    let first = extractor.run_with_opener(&mut opener).unwrap();
    let second = extractor.run_with_opener(&mut opener).unwrap();

    assert_eq!(saved_or_skipped_paths(&first), saved_or_skipped_paths(&second));
    assert_eq!(second.summary().saved, 8);
    assert_eq!(opener.calls.lock().unwrap().requested.len(), 16);
}

#[test]
fn skip_existing_leaves_files_and_skips_decoding() {
    let workspace = workspace(&["ring1.mp4"]);
    let mut opener = FakeOpener::default().with_video("ring1.mp4", FakeVideo::new(100, 25.0));

    BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .run_with_opener(&mut opener)
        .unwrap();
    let front = workspace.output.join("ring1/ring1_front.jpg");
    fs::write(&front, b"hand-edited").unwrap();

    let config = ExtractionConfig::new(&workspace.source, &workspace.output)
        .with_overwrite_policy(OverwritePolicy::SkipExisting);
    let report = BatchExtractor::new(config)
        .run_with_opener(&mut opener)
        .unwrap();

    assert_eq!(report.summary().skipped, 4);
    assert_eq!(fs::read(&front).unwrap(), b"hand-edited");
    assert_eq!(opener.calls.lock().unwrap().requested.len(), 4);
}

#[test]
fn custom_targets_control_names_and_indices() {
    let workspace = workspace(&["spin.mp4"]);
    let mut opener = FakeOpener::default().with_video("spin.mp4", FakeVideo::new(90, 30.0));
    let config = ExtractionConfig::new(&workspace.source, &workspace.output).with_targets(vec![
        Target::new(0.9, "last").unwrap(),
        Target::new(0.1, "first").unwrap(),
    ]);

    let report = BatchExtractor::new(config)
        .run_with_opener(&mut opener)
        .unwrap();

    let indices: Vec<_> = report.videos[0]
        .targets
        .iter()
        .map(|target| (target.target.label().to_string(), target.frame_index))
        .collect();
    assert_eq!(
        indices,
        [("last".to_string(), 81), ("first".to_string(), 9)]
    );
    assert_eq!(
        sorted_dir_names(&workspace.output.join("spin")),
        ["spin_first.jpg", "spin_last.jpg"]
    );
}

#[test]
fn invalid_targets_are_rejected_before_scanning() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let output = root.path().join("stills");
    let config = ExtractionConfig::new(root.path(), &output).with_targets(Vec::new());

    let result = BatchExtractor::new(config).run_with_opener(&mut FakeOpener::default());

    assert!(matches!(result, Err(ExtractError::InvalidTarget(_))));
    assert!(!output.exists());
}

// ── Events ─────────────────────────────────────────────────────────

#[derive(Default)]
struct EventLog {
    lines: Mutex<Vec<String>>,
    progress: Mutex<Vec<(u64, u64)>>,
}

impl ProgressCallback for EventLog {
    fn on_event(&self, event: &ExtractionEvent<'_>) {
        let line = match event {
            ExtractionEvent::OutputDirectoryCreated { .. } => "created".to_string(),
            ExtractionEvent::VideosFound { count } => format!("found {count}"),
            ExtractionEvent::VideoStarted { path, index } => format!(
                "start {index} {}",
                path.file_name().unwrap().to_string_lossy()
            ),
            ExtractionEvent::VideoFailed { .. } => "open failed".to_string(),
            ExtractionEvent::OutputFolderFailed { .. } => "folder failed".to_string(),
            ExtractionEvent::TargetFinished { report, .. } => match &report.outcome {
                TargetOutcome::Saved { .. } => format!("saved {}", report.target.label()),
                TargetOutcome::Skipped { .. } => format!("skipped {}", report.target.label()),
                TargetOutcome::Failed { .. } => format!("failed {}", report.target.label()),
            },
            ExtractionEvent::VideoFinished { report } => format!("finish {}", report.base_name),
            ExtractionEvent::Complete { .. } => "complete".to_string(),
            _ => "other".to_string(),
        };
        self.lines.lock().unwrap().push(line);
    }

    fn on_progress(&self, info: &ProgressInfo) {
        self.progress.lock().unwrap().push((info.current, info.total));
    }
}

#[test]
fn events_arrive_in_processing_order() {
    let workspace = workspace(&["b.mp4", "a.mp4"]);
    let mut opener = FakeOpener::default()
        .with_video("a.mp4", FakeVideo::new(8, 24.0).with_broken_frame(6));
    let log = Arc::new(EventLog::default());

    BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .with_progress(log.clone())
        .run_with_opener(&mut opener)
        .unwrap();

    let lines = log.lines.lock().unwrap();
    assert_eq!(
        *lines,
        [
            "created",
            "found 2",
            "start 0 a.mp4",
            "saved left_side",
            "saved front",
            "saved right_side",
            "failed back",
            "finish a",
            "start 1 b.mp4",
            "open failed",
            "finish b",
            "complete",
        ]
    );
    assert_eq!(*log.progress.lock().unwrap(), [(1, 2), (2, 2)]);
}

#[test]
fn blocked_output_folder_is_reported_without_opening() {
    let workspace = workspace(&["ring1.mp4", "ring2.mp4"]);
    fs::create_dir(&workspace.output).unwrap();
    // A plain file where the video's folder should go.
    fs::write(workspace.output.join("ring1"), b"").unwrap();
    let mut opener = FakeOpener::default()
        .with_video("ring1.mp4", FakeVideo::new(100, 25.0))
        .with_video("ring2.mp4", FakeVideo::new(100, 25.0));
    let log = Arc::new(EventLog::default());

    let report = BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .with_progress(log.clone())
        .run_with_opener(&mut opener)
        .unwrap();

    assert!(matches!(report.videos[0].error, Some(ExtractError::IoError(_))));
    assert!(report.videos[0].targets.is_empty());
    assert_eq!(report.videos[1].saved_count(), 4);
    assert_eq!(opener.calls.lock().unwrap().opened, ["ring2.mp4"]);

    let lines = log.lines.lock().unwrap();
    assert_eq!(lines[1..4], ["start 0 ring1.mp4", "folder failed", "finish ring1"]);
}

#[test]
fn complete_is_reported_even_when_everything_fails() {
    let workspace = workspace(&["x.mp4", "y.mp4"]);
    let log = Arc::new(EventLog::default());

    let report = BatchExtractor::new(ExtractionConfig::new(&workspace.source, &workspace.output))
        .with_progress(log.clone())
        .run_with_opener(&mut FakeOpener::default())
        .unwrap();

    assert_eq!(report.summary().unopened, 2);
    assert_eq!(log.lines.lock().unwrap().last().unwrap(), "complete");
}
