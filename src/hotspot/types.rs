//! Hotspot module core types
//!
//! Pixel buffer view, detected region output and error types.

use image::{Rgb, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================
// Error Types
// ============================================================

/// Hotspot detection error types
#[derive(Debug, Error)]
pub enum HotspotError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pixel data unavailable: {0}")]
    DecodeUnavailable(String),

    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HotspotError>;

// ============================================================
// Pixel Buffer
// ============================================================

/// Bytes per RGBA sample
pub const BYTES_PER_PIXEL: usize = 4;

/// Read-only view of a decoded RGBA image (row-major, 4 bytes per pixel)
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// Wrap raw RGBA bytes
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Borrow the pixels of an RGBA image
    pub fn from_rgba(image: &'a RgbaImage) -> Self {
        Self::new(image.width(), image.height(), image.as_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes a complete buffer of these dimensions holds
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
    }

    /// Whether every pixel of the declared dimensions can be read
    pub fn is_readable(&self) -> bool {
        matches!(self.expected_len(), Some(len) if len > 0 && self.data.len() >= len)
    }

    /// RGB value at `(x, y)`, alpha dropped.
    ///
    /// Caller guarantees `x < width`, `y < height` and a readable buffer.
    pub fn pixel_rgb(&self, x: u32, y: u32) -> Rgb<u8> {
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Rgb([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }
}

// ============================================================
// Detected Region
// ============================================================

/// Prefix of detector-assigned region ids
pub const REGION_ID_PREFIX: &str = "auto-";

/// A detected content region in percentage-of-image coordinates (0-100)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedRegion {
    /// Unique within one detection call, not stable across calls
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Regions found on one decoded image file
#[derive(Debug, Clone, PartialEq)]
pub struct PageDetection {
    /// Decoded width in pixels
    pub width: u32,
    /// Decoded height in pixels
    pub height: u32,
    pub regions: Vec<DetectedRegion>,
}
