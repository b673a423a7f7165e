//! Catalogue module
//!
//! Product records, flyer page layout and the glue between detected regions
//! and products.
//!
//! # Features
//!
//! - Flyer feed JSON loading with relative image URL resolution
//! - Sale badges and savings figures for product cards
//! - Point hit testing for hotspot selection
//! - Order or overlap based assignment of detected regions to products

mod assign;
mod loader;
mod types;

// Re-export public API
pub use assign::{assign_products, AssignmentStrategy, DEFAULT_MIN_IOU};
pub use loader::{prefix_image_url, CatalogueSource, FileCatalogue};
pub use types::{CatalogueError, FlyerData, FlyerPage, Hotspot, Product, Result};

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = include_str!("../../demos/flyer-data.json");

    #[test]
    fn test_demo_flyer_data_parses() {
        let data = FlyerData::from_json_str(DEMO).unwrap();
        assert_eq!(data.products.len(), 5);
        assert_eq!(data.flyer_page.hotspots.len(), 5);

        // Every curated hotspot points at a known product
        for hotspot in &data.flyer_page.hotspots {
            let id = hotspot.product_id.as_deref().unwrap();
            assert!(data.product(id).is_some(), "missing product {id}");
        }
    }

    #[test]
    fn test_demo_selection() {
        let data = FlyerData::from_json_str(DEMO).unwrap();

        // Middle bottom block is the barbecue
        let product = data.product_at(50.0, 80.0).unwrap();
        assert_eq!(product.name, "Barbecue");
        assert_eq!(product.sale_badge().as_deref(), Some("Save 32%"));

        // Header area has no hotspot
        assert!(data.product_at(50.0, 10.0).is_none());
    }
}
