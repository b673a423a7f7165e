//! Command-line interface definition

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::catalogue::{AssignmentStrategy, DEFAULT_MIN_IOU};
use crate::config::CliOverrides;

/// Automatic hotspot detection for retail flyer images
#[derive(Debug, Parser)]
#[command(name = "flyer-hotspots", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect hotspot regions in flyer images
    Detect(DetectArgs),
    /// Detect regions and attach products from a flyer data file
    Map(MapArgs),
    /// Generate a product insight blurb
    Insight(InsightArgs),
    /// Show system and configuration information
    Info,
}

/// Detector and output options shared by `detect` and `map`
#[derive(Debug, Clone, Args)]
pub struct DetectorArgs {
    /// Grid cell size in pixels
    #[arg(short, long)]
    pub grid_size: Option<u32>,

    /// Per-channel color difference threshold (0-255)
    #[arg(short, long)]
    pub threshold: Option<u8>,

    /// Minimum bounding-box span in grid cells
    #[arg(long = "min-span")]
    pub min_span: Option<u32>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl DetectorArgs {
    /// Only values the user actually gave override the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            grid_size: self.grid_size,
            threshold: self.threshold,
            min_span_cells: self.min_span,
            pretty: self.pretty.then_some(true),
            ..CliOverrides::new()
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct DetectArgs {
    /// Image files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub detector: DetectorArgs,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write images with detected regions outlined into this directory
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Number of worker threads
    #[arg(long)]
    pub threads: Option<usize>,
}

impl DetectArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            threads: self.threads,
            ..self.detector.overrides()
        }
    }
}

/// Region-to-product matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StrategyArg {
    /// i-th region takes the i-th curated product
    #[default]
    Order,
    /// Match by rectangle overlap
    Overlap,
}

#[derive(Debug, Clone, Args)]
pub struct MapArgs {
    /// Flyer image
    pub image: PathBuf,

    /// Flyer data JSON with products and curated hotspots
    #[arg(short, long)]
    pub flyer: PathBuf,

    #[arg(short, long, value_enum, default_value_t = StrategyArg::Order)]
    pub strategy: StrategyArg,

    /// Minimum intersection over union for overlap matching
    #[arg(long, default_value_t = DEFAULT_MIN_IOU)]
    pub min_iou: f64,

    /// Base URL for relative image URLs
    #[arg(long)]
    pub image_base_url: Option<String>,

    #[command(flatten)]
    pub detector: DetectorArgs,
}

impl MapArgs {
    pub fn strategy(&self) -> AssignmentStrategy {
        match self.strategy {
            StrategyArg::Order => AssignmentStrategy::Order,
            StrategyArg::Overlap => AssignmentStrategy::Overlap {
                min_iou: self.min_iou,
            },
        }
    }

    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            image_base_url: self.image_base_url.clone(),
            ..self.detector.overrides()
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct InsightArgs {
    /// Product id
    pub product_id: String,

    /// Flyer data JSON
    #[arg(short, long)]
    pub flyer: PathBuf,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
