//! flyer-hotspots - Automatic hotspot detection for retail flyer images
//!
//! Segments a flyer page into rectangular regions of distinct content by
//! diffing a sampling grid against the background color and grouping
//! foreground cells into connected components. Regions are reported as
//! percentages of the image size so they scale with any display.
//!
//! # Modules
//!
//! - [`hotspot`]: the detector, grid labeling and overlay rendering
//! - [`catalogue`]: products, flyer pages and region-to-product assignment
//! - [`insight`]: product blurbs from an external text generator
//! - [`config`]: TOML configuration
//! - [`cli`]: command-line definition
//! - [`progress`]: batch progress display
//!
//! # Example
//!
//! ```
//! use flyer_hotspots::{HotspotDetector, HotspotOptions, PixelBuffer};
//!
//! // 100x100 white page with one 30x30 red block at (10, 10)
//! let (w, h) = (100u32, 100u32);
//! let mut data = vec![255u8; (w * h * 4) as usize];
//! for y in 10..40 {
//!     for x in 10..40 {
//!         let i = ((y * w + x) * 4) as usize;
//!         data[i..i + 4].copy_from_slice(&[255, 0, 0, 255]);
//!     }
//! }
//!
//! let buffer = PixelBuffer::new(w, h, &data);
//! let regions = HotspotDetector::detect(&buffer, &HotspotOptions::default()).unwrap();
//! assert_eq!(regions.len(), 1);
//! assert_eq!(regions[0].id, "auto-1");
//! ```

pub mod catalogue;
pub mod cli;
pub mod config;
pub mod hotspot;
pub mod insight;
pub mod progress;

pub use catalogue::{
    assign_products, prefix_image_url, AssignmentStrategy, CatalogueError, CatalogueSource,
    FileCatalogue, FlyerData, FlyerPage, Hotspot, Product,
};
pub use cli::{Cli, Commands, DetectArgs, DetectorArgs, InsightArgs, MapArgs, StrategyArg};
pub use config::{CliOverrides, Config, ConfigError};
pub use hotspot::{
    BatchCallback, DetectedRegion, Grid, HotspotDetector, HotspotError, HotspotOptions,
    HotspotOptionsBuilder, PageDetection, PixelBuffer,
};
pub use insight::{CommandGenerator, InsightError, InsightService, TextGenerator};
pub use progress::{BatchProgress, BatchSummary, OutputMode, ProcessingStage};

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGS: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
}
