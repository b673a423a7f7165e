//! Hotspot Detection module
//!
//! Finds rectangular content regions (product photos and blocks) on a flyer
//! page without manual annotation.
//!
//! # Algorithm
//!
//! 1. Sample the background color from the top-left pixel
//! 2. Classify each `grid_size` cell as foreground when its center pixel, or
//!    any pixel on its stride-2 diagonal, differs from the background by more
//!    than `threshold` in any RGB channel
//! 3. Group foreground cells into 4-connected components with an explicit stack
//! 4. Drop components spanning fewer than `min_span_cells` in either axis and
//!    convert the rest to percentage rectangles
//!
//! The single-pixel background sample assumes the page corner is background.
//!
//! # Example
//!
//! ```rust,no_run
//! use flyer_hotspots::{HotspotDetector, HotspotOptions};
//! use std::path::Path;
//!
//! let options = HotspotOptions::builder()
//!     .grid_size(8)
//!     .threshold(30)
//!     .build();
//!
//! let regions = HotspotDetector::detect_file(Path::new("flyer.png"), &options).unwrap();
//! for region in &regions {
//!     println!("{}: {:.1}% {:.1}%", region.id, region.x, region.y);
//! }
//! ```

// Submodules
mod detect;
mod grid;
pub mod overlay;
mod types;

// Re-export public API
pub use detect::{BatchCallback, HotspotDetector};
pub use grid::{is_foreground, CellComponent, CellState, Grid};
pub use types::{
    DetectedRegion, HotspotError, PageDetection, PixelBuffer, Result, BYTES_PER_PIXEL,
    REGION_ID_PREFIX,
};

// ============================================================
// Constants
// ============================================================

/// Default cell edge length in pixels
pub const DEFAULT_GRID_SIZE: u32 = 10;

/// Default per-channel difference cutoff (0-255)
pub const DEFAULT_THRESHOLD: u8 = 20;

/// Default minimum bounding-box span in cells (`max - min`) on both axes
pub const DEFAULT_MIN_SPAN_CELLS: u32 = 2;

// ============================================================
// Options
// ============================================================

/// Hotspot detection options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotspotOptions {
    /// Cell edge length in source pixels (must be >= 1)
    pub grid_size: u32,
    /// Per-channel absolute difference above which a pixel is foreground
    pub threshold: u8,
    /// Components with `max - min` below this on either axis are noise
    pub min_span_cells: u32,
}

impl Default for HotspotOptions {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            threshold: DEFAULT_THRESHOLD,
            min_span_cells: DEFAULT_MIN_SPAN_CELLS,
        }
    }
}

impl HotspotOptions {
    /// Create a new options builder
    pub fn builder() -> HotspotOptionsBuilder {
        HotspotOptionsBuilder::default()
    }

    /// Check the options on their own, independent of any image
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(HotspotError::InvalidInput(
                "grid size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for HotspotOptions
#[derive(Debug, Default)]
pub struct HotspotOptionsBuilder {
    options: HotspotOptions,
}

impl HotspotOptionsBuilder {
    /// Set cell edge length in pixels
    #[must_use]
    pub fn grid_size(mut self, size: u32) -> Self {
        self.options.grid_size = size;
        self
    }

    /// Set foreground threshold (0-255)
    #[must_use]
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.options.threshold = threshold;
        self
    }

    /// Set minimum component span in cells
    #[must_use]
    pub fn min_span_cells(mut self, span: u32) -> Self {
        self.options.min_span_cells = span;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> HotspotOptions {
        self.options
    }
}
