use std::{
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use turnstills::{
    BatchExtractor, ExtractError, ExtractionConfig, ExtractionEvent, FfmpegLogLevel,
    OverwritePolicy, ProgressCallback, ProgressInfo, Target, TargetOutcome,
    config::{DEFAULT_EXTENSION, DEFAULT_JPEG_QUALITY},
};

const CLI_AFTER_HELP: &str = "Examples:\n  turnstills videos stills\n  turnstills videos stills --skip-existing --progress\n  turnstills videos stills --target 0:start --target 50%:middle --json\n  turnstills --completions zsh > _turnstills";

#[derive(Debug, Parser)]
#[command(
    name = "turnstills",
    version,
    about = "Extract labelled still frames from every video in a directory",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Directory containing the source videos (not searched recursively).
    #[arg(required_unless_present = "completions")]
    source_dir: Option<PathBuf>,

    /// Root directory for the per-video output folders.
    #[arg(required_unless_present = "completions")]
    output_dir: Option<PathBuf>,

    /// Frame to extract, as FRACTION:LABEL or PERCENT%:LABEL. Repeat to
    /// extract several; replaces the default left_side/front/right_side/back
    /// set.
    #[arg(long = "target", value_name = "FRACTION:LABEL")]
    targets: Vec<Target>,

    /// Extension of the videos to pick up (exact, case-sensitive).
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Keep stills that already exist instead of overwriting them.
    #[arg(long)]
    skip_existing: bool,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Print the batch report as JSON when finished.
    #[arg(long)]
    json: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<FfmpegLogLevel>,

    /// Print a shell completion script and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    fn extraction_config(&self) -> Result<ExtractionConfig, Box<dyn std::error::Error>> {
        let source_dir = self.source_dir.clone().ok_or("missing SOURCE_DIR")?;
        let output_dir = self.output_dir.clone().ok_or("missing OUTPUT_DIR")?;

        let mut config = ExtractionConfig::new(source_dir, output_dir)
            .with_extension(&self.extension)
            .with_jpeg_quality(self.quality);
        if !self.targets.is_empty() {
            config = config.with_targets(self.targets.clone());
        }
        if self.skip_existing {
            config = config.with_overwrite_policy(OverwritePolicy::SkipExisting);
        }
        config.validate()?;
        Ok(config)
    }

    fn ffmpeg_log_level(&self) -> FfmpegLogLevel {
        self.log_level.unwrap_or_else(|| {
            FfmpegLogLevel::from_log_filter(if self.verbose {
                LevelFilter::Info
            } else {
                LevelFilter::Error
            })
        })
    }
}

/// Prints the line-oriented batch log, optionally under a progress bar.
struct ConsoleReporter {
    progress_bar: Option<ProgressBar>,
}

impl ConsoleReporter {
    fn new(show_progress: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let progress_bar = if show_progress {
            let style = ProgressStyle::with_template(
                "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
            )?;
            let bar = ProgressBar::new(0);
            bar.set_style(style.progress_chars("##-"));
            Some(bar)
        } else {
            None
        };
        Ok(Self { progress_bar })
    }

    fn line(&self, message: String) {
        match &self.progress_bar {
            Some(bar) => bar.println(message),
            None => println!("{message}"),
        }
    }
}

impl ProgressCallback for ConsoleReporter {
    fn on_event(&self, event: &ExtractionEvent<'_>) {
        match event {
            ExtractionEvent::OutputDirectoryCreated { path } => {
                self.line(format!("Created output directory: {}", path.display()));
            }
            ExtractionEvent::VideosFound { count } => {
                if let Some(bar) = &self.progress_bar {
                    bar.set_length(*count as u64);
                }
                self.line(format!("Found {count} video files."));
            }
            ExtractionEvent::VideoStarted { path, .. } => {
                if let Some(bar) = &self.progress_bar {
                    let name = path.file_name().unwrap_or_default().to_string_lossy();
                    bar.set_message(name.into_owned());
                }
                self.line(format!("Processing: {}", path.display()));
            }
            ExtractionEvent::OutputFolderFailed { video, error } => {
                self.line(output_folder_failed_line(video, error));
            }
            ExtractionEvent::VideoFailed { path, error } => {
                self.line(video_failed_line(path, error));
            }
            ExtractionEvent::TargetFinished { video, report } => match &report.outcome {
                TargetOutcome::Saved { path } => {
                    self.line(format!("{} {}", "Saved:".green(), path.display()));
                }
                TargetOutcome::Skipped { path } => {
                    self.line(format!("{} {}", "Skipped existing:".yellow(), path.display()));
                }
                TargetOutcome::Failed { error } => {
                    let file_name = video.file_name().unwrap_or_default().to_string_lossy();
                    self.line(format!(
                        "{} {:.1}% for {file_name}: {error}",
                        "Failed to extract frame at".red(),
                        report.target.percentage(),
                    ));
                }
            },
            ExtractionEvent::Complete { report } => {
                self.line("Extraction complete.".green().bold().to_string());
                self.line(report.summary().to_string());
                if let Some(bar) = &self.progress_bar {
                    bar.finish_with_message("done");
                }
            }
            _ => {}
        }
    }

    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(bar) = &self.progress_bar {
            bar.set_position(info.current);
        }
    }
}

fn video_failed_line(path: &Path, error: &ExtractError) -> String {
    let reason = match error {
        ExtractError::FileOpen { reason, .. } => reason.clone(),
        other => other.to_string(),
    };
    format!(
        "{} {}: {reason}",
        "Error opening video file:".red().bold(),
        path.display()
    )
}

fn output_folder_failed_line(video: &Path, error: &ExtractError) -> String {
    let reason = match error {
        ExtractError::UnusableFileName(_) => "file name is not a usable folder name".to_string(),
        other => other.to_string(),
    };
    format!(
        "{} {}: {reason}",
        "Error creating output folder for".red().bold(),
        video.display()
    )
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "turnstills", &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);
    turnstills::set_ffmpeg_log_level(cli.ffmpeg_log_level());

    let config = cli.extraction_config()?;
    let reporter = Arc::new(ConsoleReporter::new(cli.progress)?);

    match BatchExtractor::new(config).with_progress(reporter).run() {
        Ok(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report.to_json())?);
            }
            Ok(())
        }
        Err(ExtractError::SourceNotFound(path)) => {
            println!(
                "{} {}",
                "Source directory not found:".red().bold(),
                path.display()
            );
            Ok(())
        }
        Err(error) => Err(error.into()),
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        process::exit(1);
    }
}
