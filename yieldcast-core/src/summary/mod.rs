//! Regional yield summaries for map rendering.
//!
//! Historical observations are aggregated into per-(crop, region) means, then
//! left-joined onto the authoritative region list so every renderable region
//! has a value. Both inputs are loaded at most once per [`SummaryService`].

pub mod aggregate;
pub mod export;
pub mod reconcile;
pub mod regions;

pub use aggregate::{CropGrouping, CropRegionMeans, GroupStats, RegionYieldSummary};
pub use export::{COLOR_SCALE, ChoroplethPayload, ChoroplethRow, write_csv};
pub use reconcile::{MISSING_YIELD, RegionYield, RegionYieldTable};
pub use regions::AuthoritativeRegionSet;

use crate::config::{DataConfig, RegionsConfig};
use crate::data::{ObservationSource, ResourceCell};
use crate::error::YieldError;
use crate::features::CropType;
use std::sync::Arc;

/// Serves a [`RegionYieldTable`] per crop from cached historical data.
///
/// Shares nothing with prediction: a broken data or geometry source fails
/// only calls made here.
pub struct SummaryService {
    data: DataConfig,
    regions: RegionsConfig,
    means: ResourceCell<CropRegionMeans>,
    region_set: ResourceCell<AuthoritativeRegionSet>,
}

impl SummaryService {
    pub fn new(data: DataConfig, regions: RegionsConfig) -> Self {
        Self {
            data,
            regions,
            means: ResourceCell::new("historical observations"),
            region_set: ResourceCell::new("region geometry"),
        }
    }

    pub fn name_property(&self) -> &str {
        &self.regions.name_property
    }

    /// Aggregated means, loading and aggregating the table on first use.
    pub fn means(&self) -> Result<Arc<CropRegionMeans>, YieldError> {
        self.means.get_or_load(|| {
            let table = ObservationSource::from_config(&self.data)?.load()?;
            Ok(CropRegionMeans::aggregate(&table, self.data.crop_grouping))
        })
    }

    pub fn region_set(&self) -> Result<Arc<AuthoritativeRegionSet>, YieldError> {
        self.region_set.get_or_load(|| {
            AuthoritativeRegionSet::load(&self.regions.geometry_path, &self.regions.name_property)
        })
    }

    /// Full-coverage table for `crop`. Either every region gets a row or the call fails.
    pub fn table_for(&self, crop: CropType) -> Result<RegionYieldTable, YieldError> {
        let regions = self.region_set()?;
        let summary = self.means()?.summary_for(crop);
        Ok(RegionYieldTable::reconcile(&summary, &regions))
    }

    pub fn payload_for(&self, crop: CropType) -> Result<ChoroplethPayload, YieldError> {
        let table = self.table_for(crop)?;
        Ok(ChoroplethPayload::new(&table, self.name_property()))
    }
}
