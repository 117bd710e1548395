//! Mean historical yield by (crop, region).

use crate::data::ObservationTable;
use crate::features::CropType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How stored crop labels that differ only by case are grouped before averaging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropGrouping {
    /// Group on the stored label verbatim; `Maize` and `MAIZE` stay separate.
    #[default]
    Exact,
    /// Fold labels to lowercase so case variants share one group.
    CaseInsensitive,
}

/// Mean and size of one (crop, region) group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    pub mean: f64,
    pub count: usize,
}

/// Group means keyed by (crop label, region), ordered for deterministic output.
#[derive(Debug, Clone)]
pub struct CropRegionMeans {
    grouping: CropGrouping,
    groups: BTreeMap<(String, String), GroupStats>,
}

impl CropRegionMeans {
    pub fn aggregate(table: &ObservationTable, grouping: CropGrouping) -> Self {
        let mut sums: BTreeMap<(String, String), (f64, usize)> = BTreeMap::new();
        for obs in table.rows() {
            let crop = match grouping {
                CropGrouping::Exact => obs.crop.clone(),
                CropGrouping::CaseInsensitive => obs.crop.to_lowercase(),
            };
            let entry = sums.entry((crop, obs.region.clone())).or_insert((0.0, 0));
            entry.0 += obs.yield_value;
            entry.1 += 1;
        }

        let groups: BTreeMap<_, _> = sums
            .into_iter()
            .map(|(key, (sum, count))| {
                let mean = sum / count as f64;
                (key, GroupStats { mean, count })
            })
            .collect();
        tracing::debug!(groups = groups.len(), ?grouping, "Aggregated observations");
        Self { grouping, groups }
    }

    pub fn grouping(&self) -> CropGrouping {
        self.grouping
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, crop: &str, region: &str) -> Option<GroupStats> {
        self.groups
            .get(&(crop.to_string(), region.to_string()))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, GroupStats)> {
        self.groups
            .iter()
            .map(|((crop, region), stats)| (crop.as_str(), region.as_str(), *stats))
    }

    /// Restrict to the groups whose crop label matches `crop` ignoring case.
    ///
    /// Under [`CropGrouping::Exact`] several stored variants can cover the
    /// same region. The variant with the most rows is kept; ties go to the
    /// lexicographically smallest label.
    pub fn summary_for(&self, crop: CropType) -> RegionYieldSummary {
        let mut chosen: BTreeMap<String, (&str, GroupStats)> = BTreeMap::new();
        for ((label, region), stats) in &self.groups {
            if !crop.matches_label(label) {
                continue;
            }
            match chosen.get_mut(region) {
                None => {
                    chosen.insert(region.clone(), (label.as_str(), *stats));
                }
                Some(current) => {
                    let (kept, shadowed) = if stats.count > current.1.count {
                        let previous = current.0;
                        *current = (label.as_str(), *stats);
                        (label.as_str(), previous)
                    } else {
                        (current.0, label.as_str())
                    };
                    tracing::warn!(
                        region = region.as_str(),
                        kept,
                        shadowed,
                        "Crop label case variants share a region; using the larger group"
                    );
                }
            }
        }

        RegionYieldSummary {
            crop,
            entries: chosen
                .into_iter()
                .map(|(region, (_, stats))| (region, stats))
                .collect(),
        }
    }
}

/// Mean yield per region for one selected crop.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionYieldSummary {
    crop: CropType,
    entries: BTreeMap<String, GroupStats>,
}

impl RegionYieldSummary {
    pub fn new(crop: CropType, entries: BTreeMap<String, GroupStats>) -> Self {
        Self { crop, entries }
    }

    pub fn crop(&self) -> CropType {
        self.crop
    }

    pub fn get(&self, region: &str) -> Option<GroupStats> {
        self.entries.get(region).copied()
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
