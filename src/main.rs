//! flyer-hotspots - Automatic hotspot detection for retail flyer images
//!
//! CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flyer_hotspots::hotspot::overlay;
use flyer_hotspots::insight::{FALLBACK_NOT_CONFIGURED, FALLBACK_UNAVAILABLE};
use flyer_hotspots::{
    assign_products, exit_codes, BatchCallback, BatchProgress, BatchSummary, CatalogueError,
    CatalogueSource, Cli, CliOverrides, CommandGenerator, Commands, Config, ConfigError,
    DetectArgs, DetectedRegion, FileCatalogue, FlyerPage, HotspotDetector, HotspotError,
    HotspotOptions, InsightArgs, InsightService, MapArgs, OutputMode, PageDetection,
    ProcessingStage,
};
use image::RgbaImage;

/// Extensions picked up when scanning input directories
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif"];

/// CLI-level failures not covered by the library error types
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("No images found in the given inputs")]
    NoImages,

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("{failed} of {total} images failed")]
    PartialFailure { failed: usize, total: usize },
}

fn main() {
    let cli = Cli::parse();

    let (verbose, quiet) = match &cli.command {
        Commands::Detect(args) => (args.detector.verbose, args.detector.quiet),
        Commands::Map(args) => (args.detector.verbose, args.detector.quiet),
        Commands::Insight(args) => (args.verbose, false),
        Commands::Info => (0, false),
    };
    init_tracing(verbose, quiet);

    let result = match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Map(args) => run_map(&args),
        Commands::Insight(args) => run_insight(&args),
        Commands::Info => run_info(),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    });
}

/// Log to stderr. `RUST_LOG` wins over the `-v` count.
fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<CliError>() {
            return match e {
                CliError::InputNotFound(_) | CliError::NoImages => exit_codes::INPUT_NOT_FOUND,
                CliError::UnknownProduct(_) => exit_codes::INVALID_ARGS,
                CliError::PartialFailure { .. } => exit_codes::GENERAL_ERROR,
            };
        }
        if let Some(e) = cause.downcast_ref::<HotspotError>() {
            return match e {
                HotspotError::ImageNotFound(_) => exit_codes::INPUT_NOT_FOUND,
                HotspotError::InvalidInput(_) => exit_codes::INVALID_ARGS,
                _ => exit_codes::GENERAL_ERROR,
            };
        }
        if let Some(CatalogueError::NotFound(_)) = cause.downcast_ref::<CatalogueError>() {
            return exit_codes::INPUT_NOT_FOUND;
        }
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return match e {
                ConfigError::NotFound(_) => exit_codes::INPUT_NOT_FOUND,
                ConfigError::Parse(_) => exit_codes::INVALID_ARGS,
                ConfigError::IoError(_) => exit_codes::GENERAL_ERROR,
            };
        }
    }
    exit_codes::GENERAL_ERROR
}

// ============ Helper Functions ============

/// Explicit `--config` must load; otherwise the usual lookup applies
fn load_config(path: Option<&Path>, overrides: &CliOverrides) -> Result<Config> {
    let file_config = match path {
        Some(p) => Config::load_from_path(p)
            .with_context(|| format!("failed to load config {}", p.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load config file, using defaults");
            Config::default()
        }),
    };
    Ok(file_config.merge_with_cli(overrides))
}

fn detector_options(config: &Config) -> Result<HotspotOptions> {
    let options = config.detector_options();
    options.validate()?;
    Ok(options)
}

/// Collect image files from inputs (files or directories)
fn collect_image_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for input in inputs {
        if input.is_file() {
            images.push(input.clone());
        } else if input.is_dir() {
            let mut found = Vec::new();
            for entry in std::fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && has_image_extension(&path) {
                    found.push(path);
                }
            }
            found.sort();
            images.extend(found);
        } else {
            return Err(CliError::InputNotFound(input.clone()).into());
        }
    }

    if images.is_empty() {
        return Err(CliError::NoImages.into());
    }
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn write_json<T: Serialize>(value: &T, pretty: bool, output: Option<&Path>) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

// ============ Detect Command ============

/// Detection result for one image
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectionReport {
    image: String,
    width: u32,
    height: u32,
    grid_size: u32,
    threshold: u8,
    regions: Vec<DetectedRegion>,
}

fn run_detect(args: &DetectArgs) -> Result<()> {
    let config = load_config(args.detector.config.as_deref(), &args.overrides())?;
    let options = detector_options(&config)?;
    let images = collect_image_files(&args.inputs)?;

    if let Some(threads) = config.output.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            warn!(error = %e, "could not configure thread pool");
        }
    }

    if let Some(dir) = &args.overlay {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create overlay directory {}", dir.display()))?;
    }

    info!(
        images = images.len(),
        grid_size = options.grid_size,
        threshold = options.threshold,
        "starting detection"
    );

    let mode = OutputMode::from_flags(args.detector.quiet, args.detector.verbose);
    let progress = BatchProgress::new(images.len(), mode);
    let callback = DetectCallback {
        progress: &progress,
        overlay_dir: args.overlay.as_deref(),
    };

    let results = HotspotDetector::detect_batch(&images, &options, &callback);
    progress.finish();

    let mut summary = BatchSummary {
        total_images: results.len(),
        ..Default::default()
    };
    let mut reports = Vec::with_capacity(results.len());
    let mut last_error = None;

    for (path, result) in results {
        match result {
            Ok(page) => {
                summary.succeeded += 1;
                summary.total_regions += page.regions.len();
                reports.push(DetectionReport {
                    image: path.display().to_string(),
                    width: page.width,
                    height: page.height,
                    grid_size: options.grid_size,
                    threshold: options.threshold,
                    regions: page.regions,
                });
            }
            Err(e) => {
                summary.failed += 1;
                warn!(image = %path.display(), error = %e, "detection failed");
                last_error = Some(e);
            }
        }
    }

    write_json(&reports, config.output.pretty, args.output.as_deref())?;
    progress.print_summary(&summary);

    match last_error {
        // A single input keeps its own error so the exit code reflects it
        Some(e) if summary.total_images == 1 => Err(e.into()),
        Some(_) => Err(CliError::PartialFailure {
            failed: summary.failed,
            total: summary.total_images,
        }
        .into()),
        None => Ok(()),
    }
}

/// Progress reporting and overlay output for `detect`
struct DetectCallback<'a> {
    progress: &'a BatchProgress,
    overlay_dir: Option<&'a Path>,
}

impl BatchCallback for DetectCallback<'_> {
    fn on_stage(&self, path: &Path, stage: ProcessingStage) {
        self.progress.stage(&path.display().to_string(), stage);
    }

    fn on_detected(
        &self,
        path: &Path,
        image: &RgbaImage,
        regions: &[DetectedRegion],
    ) -> std::result::Result<(), HotspotError> {
        let Some(dir) = self.overlay_dir else {
            return Ok(());
        };
        self.on_stage(path, ProcessingStage::RenderingOverlay);
        overlay::save_overlay(&overlay::overlay_path(dir, path), image, regions)
    }

    fn on_complete(&self, path: &Path, result: &std::result::Result<PageDetection, HotspotError>) {
        let name = path.display().to_string();
        match result {
            Ok(page) => {
                self.progress.stage(&name, ProcessingStage::Completed);
                self.progress.finish_item(&name, page.regions.len());
            }
            Err(e) => self.progress.fail_item(&name, &e.to_string()),
        }
    }
}

// ============ Map Command ============

fn run_map(args: &MapArgs) -> Result<()> {
    let config = load_config(args.detector.config.as_deref(), &args.overrides())?;
    let options = detector_options(&config)?;

    let mut catalogue = FileCatalogue::new(args.flyer.clone());
    if let Some(base) = &config.catalogue.image_base_url {
        catalogue = catalogue.with_image_base_url(base.clone());
    }
    let data = catalogue.fetch_flyer_data()?;

    let regions = HotspotDetector::detect_file(&args.image, &options)?;
    let hotspots = assign_products(&regions, &data.flyer_page.hotspots, args.strategy());

    let mapped = hotspots.iter().filter(|h| h.product_id.is_some()).count();
    info!(regions = regions.len(), mapped, "assigned products");

    let page = FlyerPage {
        hotspots,
        ..data.flyer_page
    };
    write_json(&page, config.output.pretty, None)
}

// ============ Insight Command ============

fn run_insight(args: &InsightArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), &CliOverrides::new())?;
    let data = FileCatalogue::new(args.flyer.clone()).fetch_flyer_data()?;

    let product = data
        .product(&args.product_id)
        .ok_or_else(|| CliError::UnknownProduct(args.product_id.clone()))?;

    let insight = &config.insight;
    let service = match &insight.command {
        Some(command) => InsightService::from_env(
            CommandGenerator::new(command.clone(), insight.args.clone()),
            &insight.api_key_env,
            insight.retailer.clone(),
        ),
        None => InsightService::new(None, insight.retailer.clone()),
    };

    let text = service.generate_insight(product);
    if text == FALLBACK_NOT_CONFIGURED || text == FALLBACK_UNAVAILABLE {
        warn!(product = %product.id, "insight generation unavailable");
    }
    println!("{text}");
    Ok(())
}

// ============ Info Command ============

fn run_info() -> Result<()> {
    println!("flyer-hotspots v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    let defaults = HotspotOptions::default();
    println!();
    println!("Detector Defaults:");
    println!("  Grid size: {} px", defaults.grid_size);
    println!("  Threshold: {}", defaults.threshold);
    println!("  Min span:  {} cells", defaults.min_span_cells);

    let config = load_config(None, &CliOverrides::new())?;
    println!();
    println!("Insight Generator:");
    match &config.insight.command {
        Some(command) => check_tool(command, "Command"),
        None => println!("  Command: not configured"),
    }
    let key_set = std::env::var(&config.insight.api_key_env).is_ok_and(|v| !v.is_empty());
    println!(
        "  Credential ({}): {}",
        config.insight.api_key_env,
        if key_set { "set" } else { "not set" }
    );

    println!();
    println!("Config File Locations:");
    for (i, location) in Config::config_locations().iter().enumerate() {
        let label = if i == 0 { "Local" } else { "User " };
        let found = if location.is_file() { " (found)" } else { "" };
        println!("  {}: {}{}", label, location.display(), found);
    }

    Ok(())
}

fn check_tool(cmd: &str, name: &str) {
    match which::which(cmd) {
        Ok(path) => println!("  {}: {} (found)", name, path.display()),
        Err(_) => println!("  {}: {} (not found)", name, cmd),
    }
}
