//! Extraction targets.
//!
//! A [`Target`] names one still to pull from every video: a fraction of the
//! frame count and a label used in the output file name. The default set
//! covers the four sides of a turntable rotation.

use std::{collections::HashSet, fmt, str::FromStr};

use crate::error::ExtractError;

const DEFAULT_TARGETS: [(f64, &str); 4] = [
    (0.0, "left_side"),
    (0.25, "front"),
    (0.5, "right_side"),
    (0.75, "back"),
];

/// A (fraction, label) pair.
///
/// # Example
///
/// ```
/// use turnstills::Target;
///
/// let front = Target::new(0.25, "front")?;
/// assert_eq!(front.frame_index(100), 25);
/// assert_eq!(front.file_name("ring1"), "ring1_front.jpg");
/// # Ok::<(), turnstills::ExtractError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    fraction: f64,
    label: String,
}

impl Target {
    /// Create a target.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidTarget`] if `fraction` is not in `[0.0, 1.0)`
    /// or the label is empty, `.`/`..`, or contains a path separator.
    pub fn new(fraction: f64, label: impl Into<String>) -> Result<Self, ExtractError> {
        let label = label.into();

        if !(0.0..1.0).contains(&fraction) {
            return Err(ExtractError::InvalidTarget(format!(
                "fraction {fraction} for '{label}' must be in [0.0, 1.0)"
            )));
        }
        if label.is_empty() || label == "." || label == ".." {
            return Err(ExtractError::InvalidTarget(format!(
                "'{label}' is not a usable label"
            )));
        }
        if label.contains(['/', '\\']) {
            return Err(ExtractError::InvalidTarget(format!(
                "label '{label}' must not contain path separators"
            )));
        }

        Ok(Self { fraction, label })
    }

    /// Fraction of the frame count, in `[0.0, 1.0)`.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// The fraction as a percentage.
    pub fn percentage(&self) -> f64 {
        self.fraction * 100.0
    }

    /// Label used verbatim in the output file name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Frame index for a video with `total_frames` frames:
    /// `floor(total_frames × fraction)`, never past the last frame.
    pub fn frame_index(&self, total_frames: u64) -> u64 {
        let index = (total_frames as f64 * self.fraction) as u64;
        index.min(total_frames.saturating_sub(1))
    }

    /// Output file name for a video with the given base name.
    pub fn file_name(&self, base_name: &str) -> String {
        format!("{base_name}_{}.jpg", self.label)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.fraction, self.label)
    }
}

/// Parses `FRACTION:LABEL` or `PERCENT%:LABEL`, e.g. `0.25:front` or
/// `25%:front`.
impl FromStr for Target {
    type Err = ExtractError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (position, label) = value.split_once(':').ok_or_else(|| {
            ExtractError::InvalidTarget(format!("expected FRACTION:LABEL, got '{value}'"))
        })?;
        let position = position.trim();

        let fraction = match position.strip_suffix('%') {
            Some(percent) => percent.trim().parse::<f64>().map(|p| p / 100.0),
            None => position.parse::<f64>(),
        }
        .map_err(|_| ExtractError::InvalidTarget(format!("'{position}' is not a number")))?;

        Target::new(fraction, label.trim())
    }
}

/// The four turntable targets: left side at 0%, front at 25%, right side at
/// 50% and back at 75%.
pub fn default_targets() -> Vec<Target> {
    DEFAULT_TARGETS
        .iter()
        .map(|&(fraction, label)| Target {
            fraction,
            label: label.to_string(),
        })
        .collect()
}

/// Check a target list: non-empty, labels unique.
pub(crate) fn validate_targets(targets: &[Target]) -> Result<(), ExtractError> {
    if targets.is_empty() {
        return Err(ExtractError::InvalidTarget(
            "at least one target is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for target in targets {
        if !seen.insert(target.label()) {
            return Err(ExtractError::InvalidTarget(format!(
                "duplicate label '{}'",
                target.label()
            )));
        }
    }
    Ok(())
}
