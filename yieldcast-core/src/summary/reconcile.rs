//! Left join of per-region means onto the authoritative region list.

use crate::features::CropType;
use crate::summary::{AuthoritativeRegionSet, RegionYieldSummary};
use serde::Serialize;

/// Value given to regions with no historical observations.
pub const MISSING_YIELD: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionYield {
    pub region: String,
    pub value: f64,
    /// False when `value` is the zero fill.
    pub matched: bool,
    pub observations: usize,
}

/// One row per authoritative region, in region-set order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionYieldTable {
    pub crop: CropType,
    pub rows: Vec<RegionYield>,
    /// Summary regions whose names matched no authoritative region.
    pub unmatched_regions: Vec<String>,
}

impl RegionYieldTable {
    /// Region names join by exact string equality; nothing is normalized.
    pub fn reconcile(summary: &RegionYieldSummary, regions: &AuthoritativeRegionSet) -> Self {
        let rows: Vec<RegionYield> = regions
            .names()
            .iter()
            .map(|region| match summary.get(region) {
                Some(stats) => RegionYield {
                    region: region.clone(),
                    value: stats.mean,
                    matched: true,
                    observations: stats.count,
                },
                None => RegionYield {
                    region: region.clone(),
                    value: MISSING_YIELD,
                    matched: false,
                    observations: 0,
                },
            })
            .collect();

        let unmatched_regions: Vec<String> = summary
            .regions()
            .filter(|r| !regions.contains(r))
            .map(str::to_string)
            .collect();
        if !unmatched_regions.is_empty() {
            tracing::warn!(
                crop = %summary.crop(),
                unmatched = ?unmatched_regions,
                "Historical regions not present in region geometry"
            );
        }

        let matched = rows.iter().filter(|r| r.matched).count();
        tracing::debug!(
            crop = %summary.crop(),
            regions = rows.len(),
            matched,
            "Reconciled region yields"
        );

        Self {
            crop: summary.crop(),
            rows,
            unmatched_regions,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, region: &str) -> Option<f64> {
        self.rows.iter().find(|r| r.region == region).map(|r| r.value)
    }

    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.matched).count()
    }
}
