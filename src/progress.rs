//! Progress display for batch detection.
//!
//! Everything here writes to stderr so JSON reports on stdout stay clean.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;
use std::time::Instant;

/// Processing stages for one flyer image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingStage {
    #[default]
    Initializing,
    /// Decoding the image file
    Decoding,
    /// Grid classification and labeling
    Detecting,
    /// Writing the overlay image
    RenderingOverlay,
    Completed,
}

impl ProcessingStage {
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::Initializing => "Initializing",
            ProcessingStage::Decoding => "Decoding",
            ProcessingStage::Detecting => "Detecting",
            ProcessingStage::RenderingOverlay => "RenderingOverlay",
            ProcessingStage::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much `detect` reports on stderr while it runs.
///
/// Variants are ordered, each one shows everything the previous one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum OutputMode {
    /// No bar, no summary (`-q`)
    Quiet,
    /// Progress bar, failed images and the final summary
    #[default]
    Progress,
    /// Adds the region count of every image (`-v`)
    Regions,
    /// Adds every processing stage of every image (`-vv`)
    Stages,
}

impl OutputMode {
    /// `-q` overrides any number of `-v`
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => OutputMode::Quiet,
            (false, 0) => OutputMode::Progress,
            (false, 1) => OutputMode::Regions,
            (false, _) => OutputMode::Stages,
        }
    }
}

/// Progress bar template
const BAR_TEMPLATE: &str = "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}";

/// Batch progress over a set of images.
///
/// Safe to share across rayon workers. Hidden in quiet mode.
pub struct BatchProgress {
    bar: ProgressBar,
    mode: OutputMode,
    start_time: Instant,
}

impl BatchProgress {
    pub fn new(total: usize, mode: OutputMode) -> Self {
        let bar = if mode >= OutputMode::Progress {
            ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr())
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            bar,
            mode,
            start_time: Instant::now(),
        }
    }

    /// Report a stage change for one image
    pub fn stage(&self, image: &str, stage: ProcessingStage) {
        if let Some(line) = self.stage_line(image, stage) {
            self.bar.println(line);
        }
    }

    /// Mark one image done
    pub fn finish_item(&self, image: &str, region_count: usize) {
        if let Some(line) = self.regions_line(image, region_count) {
            self.bar.println(line);
        }
        self.bar.set_message(image.to_string());
        self.bar.inc(1);
    }

    /// Mark one image failed
    pub fn fail_item(&self, image: &str, error: &str) {
        if let Some(line) = self.failure_line(image, error) {
            self.bar.println(line);
        }
        self.bar.inc(1);
    }

    fn stage_line(&self, image: &str, stage: ProcessingStage) -> Option<String> {
        (self.mode >= OutputMode::Stages).then(|| format!("  {image}: {stage}"))
    }

    fn regions_line(&self, image: &str, region_count: usize) -> Option<String> {
        (self.mode >= OutputMode::Regions).then(|| format!("  {image}: {region_count} regions"))
    }

    fn failure_line(&self, image: &str, error: &str) -> Option<String> {
        (self.mode >= OutputMode::Progress).then(|| format!("  {image}: error: {error}"))
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Print final summary
    pub fn print_summary(&self, summary: &BatchSummary) {
        if self.mode == OutputMode::Quiet {
            return;
        }
        eprintln!("{}", summary.render(self.elapsed_secs()));
    }
}

/// Counts for the final summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total_images: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_regions: usize,
}

impl BatchSummary {
    pub fn render(&self, elapsed_secs: f64) -> String {
        let rule = "=".repeat(60);
        format!(
            "{rule}\nDetection Summary\n{rule}\n  Total images: {}\n  Succeeded:    {}\n  Errors:       {}\n  Regions:      {}\n  Elapsed:      {:.2}s\n{rule}",
            self.total_images, self.succeeded, self.failed, self.total_regions, elapsed_secs
        )
    }
}
