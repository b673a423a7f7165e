//! Debug overlay rendering
//!
//! Draws detected regions onto a copy of the source image so detection
//! parameters can be checked by eye.

use image::{ImageError, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

use super::types::{DetectedRegion, HotspotError, Result};

/// Default outline color
pub const DEFAULT_OVERLAY_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Outline thickness in pixels
const OUTLINE_THICKNESS: i32 = 2;

/// Convert a percentage region to a pixel rectangle on an image of the given size
pub fn region_to_rect(region: &DetectedRegion, width: u32, height: u32) -> Option<Rect> {
    let x = (region.x / 100.0 * width as f64).round() as i32;
    let y = (region.y / 100.0 * height as f64).round() as i32;
    let w = (region.width / 100.0 * width as f64).round() as u32;
    let h = (region.height / 100.0 * height as f64).round() as u32;

    (w > 0 && h > 0).then(|| Rect::at(x, y).of_size(w, h))
}

/// Draw region outlines in place
pub fn draw_regions(image: &mut RgbaImage, regions: &[DetectedRegion], color: Rgba<u8>) {
    let (width, height) = image.dimensions();

    for region in regions {
        let Some(rect) = region_to_rect(region, width, height) else {
            continue;
        };

        for inset in 0..OUTLINE_THICKNESS {
            let w = rect.width().saturating_sub(2 * inset as u32);
            let h = rect.height().saturating_sub(2 * inset as u32);
            if w == 0 || h == 0 {
                break;
            }
            let inner = Rect::at(rect.left() + inset, rect.top() + inset).of_size(w, h);
            draw_hollow_rect_mut(image, inner, color);
        }
    }
}

/// Render region outlines over `image` and save the result to `output_path`.
///
/// Filesystem failures surface as [`HotspotError::IoError`], encoder
/// failures as [`HotspotError::InvalidImage`].
pub fn save_overlay(output_path: &Path, image: &RgbaImage, regions: &[DetectedRegion]) -> Result<()> {
    let mut canvas = image.clone();
    draw_regions(&mut canvas, regions, DEFAULT_OVERLAY_COLOR);
    canvas.save(output_path).map_err(|e| match e {
        ImageError::IoError(io) => HotspotError::IoError(io),
        other => HotspotError::InvalidImage(format!("{}: {}", output_path.display(), other)),
    })
}

/// Overlay file for `image_path` inside `dir`: `<stem>.overlay.png`
pub fn overlay_path(dir: &Path, image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    dir.join(format!("{stem}.overlay.png"))
}
