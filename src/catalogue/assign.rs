//! Region-to-product assignment
//!
//! Detected regions are anonymous geometry. These helpers attach product
//! ids by matching them against a curated hotspot list.

use super::types::Hotspot;
use crate::hotspot::DetectedRegion;

/// Default minimum intersection over union for overlap matching
pub const DEFAULT_MIN_IOU: f64 = 0.1;

/// How detected regions are paired with curated hotspots
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AssignmentStrategy {
    /// The i-th region takes the product of the i-th curated hotspot
    #[default]
    Order,
    /// Each region takes the unused curated hotspot it overlaps most
    Overlap { min_iou: f64 },
}

impl AssignmentStrategy {
    /// Overlap matching with [`DEFAULT_MIN_IOU`]
    pub fn overlap() -> Self {
        AssignmentStrategy::Overlap {
            min_iou: DEFAULT_MIN_IOU,
        }
    }
}

/// Turn detected regions into hotspots, attaching curated product ids.
///
/// Output order follows `regions`. Regions without a match keep
/// `product_id = None` for manual assignment.
pub fn assign_products(
    regions: &[DetectedRegion],
    curated: &[Hotspot],
    strategy: AssignmentStrategy,
) -> Vec<Hotspot> {
    match strategy {
        AssignmentStrategy::Order => regions
            .iter()
            .enumerate()
            .map(|(i, region)| {
                let product_id = curated.get(i).and_then(|h| h.product_id.clone());
                Hotspot::from_region(region, product_id)
            })
            .collect(),
        AssignmentStrategy::Overlap { min_iou } => assign_by_overlap(regions, curated, min_iou),
    }
}

/// Greedy matching: highest-IoU pairs are fixed first
fn assign_by_overlap(regions: &[DetectedRegion], curated: &[Hotspot], min_iou: f64) -> Vec<Hotspot> {
    let mut hotspots: Vec<Hotspot> = regions
        .iter()
        .map(|r| Hotspot::from_region(r, None))
        .collect();

    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for (ri, detected) in hotspots.iter().enumerate() {
        for (ci, target) in curated.iter().enumerate() {
            let iou = detected.iou(target);
            if iou > min_iou {
                candidates.push((iou, ri, ci));
            }
        }
    }

    // Highest IoU first, ties by region then curated order
    candidates.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut region_taken = vec![false; hotspots.len()];
    let mut curated_taken = vec![false; curated.len()];

    for (_, ri, ci) in candidates {
        if region_taken[ri] || curated_taken[ci] {
            continue;
        }
        region_taken[ri] = true;
        curated_taken[ci] = true;
        hotspots[ri].product_id = curated[ci].product_id.clone();
    }

    hotspots
}
