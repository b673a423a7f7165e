//! Hotspot Detection Implementation
//!
//! Background sampling, grid classification, labeling and region emission.

use image::{DynamicImage, Rgb, RgbaImage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::grid::{CellComponent, Grid};
use super::types::{
    DetectedRegion, HotspotError, PageDetection, PixelBuffer, Result, REGION_ID_PREFIX,
};
use super::HotspotOptions;
use crate::progress::ProcessingStage;

/// Per-image hooks for [`HotspotDetector::detect_batch`].
///
/// Hooks run on rayon worker threads, one image per call.
pub trait BatchCallback: Sync {
    /// Called when an image enters a new stage
    fn on_stage(&self, _path: &Path, _stage: ProcessingStage) {}

    /// Called with the decoded image and its regions. An error fails that image.
    fn on_detected(
        &self,
        _path: &Path,
        _image: &RgbaImage,
        _regions: &[DetectedRegion],
    ) -> Result<()> {
        Ok(())
    }

    /// Called once per image with its final result
    fn on_complete(&self, _path: &Path, _result: &Result<PageDetection>) {}
}

/// No hooks
impl BatchCallback for () {}

/// Grid-based hotspot detector for flyer pages
pub struct HotspotDetector;

impl HotspotDetector {
    /// Detect content regions in a pixel buffer.
    ///
    /// A buffer without readable pixel data yields no regions; use
    /// [`HotspotDetector::try_detect`] to observe that case as an error.
    pub fn detect(
        buffer: &PixelBuffer<'_>,
        options: &HotspotOptions,
    ) -> Result<Vec<DetectedRegion>> {
        match Self::try_detect(buffer, options) {
            Err(HotspotError::DecodeUnavailable(reason)) => {
                warn!(%reason, "pixel data unavailable, no hotspots detected");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Detect content regions, reporting unreadable pixel data as
    /// [`HotspotError::DecodeUnavailable`]
    pub fn try_detect(
        buffer: &PixelBuffer<'_>,
        options: &HotspotOptions,
    ) -> Result<Vec<DetectedRegion>> {
        Self::validate(buffer, options)?;

        let width = buffer.width();
        let height = buffer.height();

        // Step 1: Sample background (top-left pixel is assumed to be page background)
        let background = Self::sample_background(buffer);

        // Step 2: Foreground grid
        let mut grid = Grid::classify(buffer, background, options.grid_size, options.threshold);
        debug!(
            width,
            height,
            cols = grid.cols(),
            rows = grid.rows(),
            active = grid.active_count(),
            "classified grid"
        );

        // Step 3: Connected components
        let components = grid.label();

        // Step 4: Filter noise and convert to percentages
        let regions: Vec<DetectedRegion> = components
            .iter()
            .filter(|c| Self::is_significant(c, options))
            .enumerate()
            .map(|(i, c)| Self::to_region(i + 1, c, width, height, options.grid_size))
            .collect();

        debug!(
            components = components.len(),
            regions = regions.len(),
            "emitted hotspots"
        );

        Ok(regions)
    }

    /// Detect content regions in a decoded image
    pub fn detect_image(
        image: &DynamicImage,
        options: &HotspotOptions,
    ) -> Result<Vec<DetectedRegion>> {
        let rgba = image.to_rgba8();
        Self::detect(&PixelBuffer::from_rgba(&rgba), options)
    }

    /// Detect content regions in an image file
    pub fn detect_file(image_path: &Path, options: &HotspotOptions) -> Result<Vec<DetectedRegion>> {
        let img = Self::open(image_path)?;
        Self::detect_image(&img, options)
    }

    /// Open and decode an image file
    pub fn open(image_path: &Path) -> Result<DynamicImage> {
        if !image_path.exists() {
            return Err(HotspotError::ImageNotFound(image_path.to_path_buf()));
        }

        image::open(image_path).map_err(|e| HotspotError::InvalidImage(e.to_string()))
    }

    /// Detect content regions in many image files in parallel.
    ///
    /// Results keep the order of `image_paths`; one failing file does not
    /// affect the others.
    pub fn detect_batch<C>(
        image_paths: &[PathBuf],
        options: &HotspotOptions,
        callback: &C,
    ) -> Vec<(PathBuf, Result<PageDetection>)>
    where
        C: BatchCallback + ?Sized,
    {
        image_paths
            .par_iter()
            .map(|path| {
                let result = Self::detect_page(path, options, callback);
                callback.on_complete(path, &result);
                (path.clone(), result)
            })
            .collect()
    }

    fn detect_page<C>(path: &Path, options: &HotspotOptions, callback: &C) -> Result<PageDetection>
    where
        C: BatchCallback + ?Sized,
    {
        callback.on_stage(path, ProcessingStage::Decoding);
        let rgba = Self::open(path)?.to_rgba8();

        callback.on_stage(path, ProcessingStage::Detecting);
        let regions = Self::detect(&PixelBuffer::from_rgba(&rgba), options)?;
        callback.on_detected(path, &rgba, &regions)?;

        Ok(PageDetection {
            width: rgba.width(),
            height: rgba.height(),
            regions,
        })
    }

    fn validate(buffer: &PixelBuffer<'_>, options: &HotspotOptions) -> Result<()> {
        if buffer.width() == 0 || buffer.height() == 0 {
            return Err(HotspotError::InvalidInput(format!(
                "image dimensions must be positive, got {}x{}",
                buffer.width(),
                buffer.height()
            )));
        }

        options.validate()?;

        if !buffer.is_readable() {
            return Err(HotspotError::DecodeUnavailable(format!(
                "expected {} bytes of RGBA data for {}x{}",
                buffer
                    .expected_len()
                    .map_or_else(|| "too many".to_string(), |n| n.to_string()),
                buffer.width(),
                buffer.height()
            )));
        }

        Ok(())
    }

    fn sample_background(buffer: &PixelBuffer<'_>) -> Rgb<u8> {
        buffer.pixel_rgb(0, 0)
    }

    /// Components spanning fewer than `min_span_cells` in either axis are noise
    fn is_significant(component: &CellComponent, options: &HotspotOptions) -> bool {
        component.col_span() >= options.min_span_cells
            && component.row_span() >= options.min_span_cells
    }

    fn to_region(
        number: usize,
        component: &CellComponent,
        width: u32,
        height: u32,
        grid_size: u32,
    ) -> DetectedRegion {
        let g = grid_size as u64;
        let x = component.min_col as u64 * g;
        let y = component.min_row as u64 * g;
        let w = (component.col_span() as u64 + 1).saturating_mul(g).min(width as u64);
        let h = (component.row_span() as u64 + 1).saturating_mul(g).min(height as u64);

        let (width, height) = (width as f64, height as f64);

        DetectedRegion {
            id: format!("{REGION_ID_PREFIX}{number}"),
            x: x as f64 / width * 100.0,
            y: y as f64 / height * 100.0,
            width: w as f64 / width * 100.0,
            height: h as f64 / height * 100.0,
        }
    }
}
