//! Catalogue core types
//!
//! Product records and flyer page metadata, in the JSON shape the flyer
//! data feed uses (camelCase keys, percentage hotspot rectangles).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::hotspot::DetectedRegion;

// ============================================================
// Error Types
// ============================================================

/// Catalogue error types
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Flyer data not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid flyer data: {0}")]
    InvalidJson(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogueError>;

/// Rounded savings above which badges show a dollar amount instead of a percentage
const BADGE_DOLLAR_THRESHOLD: u32 = 100;

// ============================================================
// Product
// ============================================================

/// A catalogue product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub sku: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub description: String,
    pub image_url: String,
    pub category: String,
    pub rating: f64,
}

impl Product {
    /// Original price when it is above the sale price
    fn discounted_from(&self) -> Option<f64> {
        self.original_price.filter(|orig| *orig > self.price)
    }

    /// Savings in whole dollars (rounded), 0 when not on sale
    pub fn savings_amount(&self) -> u32 {
        self.discounted_from()
            .map_or(0, |orig| (orig - self.price).round() as u32)
    }

    /// Savings as a rounded percentage of the original price, 0 when not on sale
    pub fn savings_percent(&self) -> u32 {
        self.discounted_from()
            .map_or(0, |orig| ((orig - self.price) / orig * 100.0).round() as u32)
    }

    /// Flyer card badge: `"Save $N"` for large savings, otherwise `"Save N%"`.
    ///
    /// The percentage is taken from the rounded dollar amount, as printed
    /// on the card.
    pub fn sale_badge(&self) -> Option<String> {
        let orig = self.discounted_from()?;
        let amount = self.savings_amount();
        if amount > BADGE_DOLLAR_THRESHOLD {
            Some(format!("Save ${amount}"))
        } else {
            let percent = (amount as f64 / orig * 100.0).round() as u32;
            Some(format!("Save {percent}%"))
        }
    }
}

// ============================================================
// Hotspot / Flyer Page
// ============================================================

/// A clickable flyer region, optionally associated with a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Hotspot {
    /// Build a hotspot from a detected region
    pub fn from_region(region: &DetectedRegion, product_id: Option<String>) -> Self {
        Self {
            id: region.id.clone(),
            product_id,
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
        }
    }

    /// Whether the percentage point lies inside this hotspot (edges inclusive)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Intersection over union with another rectangle
    pub fn iou(&self, other: &Hotspot) -> f64 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);

        let intersection = (right - left).max(0.0) * (bottom - top).max(0.0);
        let union = self.width * self.height + other.width * other.height - intersection;

        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// A single flyer page image and its hotspots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyerPage {
    pub id: String,
    pub image_url: String,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl FlyerPage {
    /// First hotspot containing the percentage point
    pub fn hotspot_at(&self, x: f64, y: f64) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.contains(x, y))
    }
}

/// Complete flyer feed: products keyed by id plus the page layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyerData {
    pub products: BTreeMap<String, Product>,
    pub flyer_page: FlyerPage,
}

impl FlyerData {
    /// Look up a product by id
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Product linked to the hotspot under a percentage point
    pub fn product_at(&self, x: f64, y: f64) -> Option<&Product> {
        self.flyer_page
            .hotspot_at(x, y)
            .and_then(|h| h.product_id.as_deref())
            .and_then(|id| self.product(id))
    }
}
