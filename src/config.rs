//! Extraction configuration.
//!
//! [`ExtractionConfig`] carries everything a batch needs: where to read
//! videos from, where to write stills, which targets to extract, and how to
//! treat files that already exist.
//!
//! # Example
//!
//! ```
//! use turnstills::{ExtractionConfig, OverwritePolicy, Target};
//!
//! let config = ExtractionConfig::new("videos", "stills")
//!     .with_targets(vec![Target::new(0.0, "start")?, Target::new(0.5, "middle")?])
//!     .with_overwrite_policy(OverwritePolicy::SkipExisting)
//!     .with_jpeg_quality(85);
//! config.validate()?;
//! # Ok::<(), turnstills::ExtractError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::{
    error::ExtractError,
    target::{self, Target},
};

/// Default file extension of source videos.
pub const DEFAULT_EXTENSION: &str = "mp4";

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// What to do when an output image already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Decode and write the frame again, replacing the file. This is the
    /// default.
    #[default]
    Overwrite,
    /// Leave the existing file alone and do not decode the frame.
    SkipExisting,
}

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub(crate) source_dir: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) targets: Vec<Target>,
    pub(crate) extension: String,
    pub(crate) overwrite: OverwritePolicy,
    pub(crate) jpeg_quality: u8,
}

impl ExtractionConfig {
    /// Configuration with the default targets, `mp4` extension, overwrite
    /// policy and JPEG quality 90.
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            targets: target::default_targets(),
            extension: DEFAULT_EXTENSION.to_string(),
            overwrite: OverwritePolicy::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Replace the target list. Order is kept and determines processing
    /// order.
    #[must_use]
    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    /// Set the extension of files picked up from the source directory.
    ///
    /// Matching is exact and case-sensitive. A leading `.` is ignored.
    #[must_use]
    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim_start_matches('.').to_string();
        self
    }

    /// Set how existing output images are treated.
    #[must_use]
    pub fn with_overwrite_policy(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite = policy;
        self
    }

    /// Set the JPEG quality, clamped to `1..=100`.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Directory scanned for videos.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Root directory for the per-video output folders.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Targets extracted from every video.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Extension of source videos, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Policy for existing output files.
    pub fn overwrite_policy(&self) -> OverwritePolicy {
        self.overwrite
    }

    /// JPEG quality used when writing stills.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Check the configuration before a run.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidTarget`] for an empty or duplicated target
    /// list, [`ExtractError::InvalidConfiguration`] for an empty extension.
    pub fn validate(&self) -> Result<(), ExtractError> {
        target::validate_targets(&self.targets)?;
        if self.extension.is_empty() {
            return Err(ExtractError::InvalidConfiguration(
                "video extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
