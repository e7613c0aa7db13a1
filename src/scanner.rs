//! Source directory scanning and output layout.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use crate::error::ExtractError;

/// List the videos directly inside `source_dir`.
///
/// Only regular files whose extension equals `extension` exactly are
/// returned (case-sensitive, so `clip.MP4` does not match `mp4`). Hidden
/// files (names starting with `.`) are skipped, as a shell glob would.
/// Subdirectories are never descended into. Results are sorted by file
/// name so runs are reproducible.
///
/// # Errors
///
/// [`ExtractError::SourceNotFound`] if `source_dir` does not exist or is not
/// a directory; [`ExtractError::IoError`] if it cannot be listed.
pub fn scan_videos(source_dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ExtractError> {
    if !source_dir.is_dir() {
        return Err(ExtractError::SourceNotFound(source_dir.to_path_buf()));
    }

    let extension = OsStr::new(extension.trim_start_matches('.'));
    let mut videos = Vec::new();

    for entry in fs::read_dir(source_dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                log::warn!("Skipping unreadable entry in {}: {error}", source_dir.display());
                continue;
            }
        };

        if entry.file_name().as_encoded_bytes().starts_with(b".") {
            continue;
        }

        let path = entry.path();
        if path.extension() == Some(extension) && path.is_file() {
            videos.push(path);
        }
    }

    videos.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::debug!("Found {} video(s) in {}", videos.len(), source_dir.display());
    Ok(videos)
}

/// Create the output root if it is missing.
///
/// Returns `true` when the directory was created by this call. Parents are
/// not created.
pub fn prepare_output_root(output_dir: &Path) -> Result<bool, ExtractError> {
    if output_dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir(output_dir)?;
    log::debug!("Created output directory {}", output_dir.display());
    Ok(true)
}

/// File name without directory components and without the final extension.
///
/// `videos/ring1.mp4` gives `ring1`; `a.b.mp4` gives `a.b`.
pub fn base_name(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
