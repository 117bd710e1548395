//! # yieldcast-core — Crop Yield Estimation and Regional Summaries
//!
//! Two independent pipelines share this crate:
//!
//! - **Prediction**: soil and weather readings plus a crop choice are encoded
//!   into a [`FeatureVector`] that matches the fitted model's
//!   [`FeatureSchema`] exactly, then handed to a [`YieldPredictor`].
//! - **Regional summary**: historical observations are averaged per
//!   (crop, region) and reconciled against the authoritative region list so
//!   a map renderer receives a value for every region.
//!
//! A failure in one pipeline never blocks the other.

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod inference;
pub mod runtime;
pub mod summary;

// Re-exports
pub use config::{YieldConfig, load_config};
pub use error::YieldError;
pub use features::{
    CropType, FeatureSchema, FeatureVector, FeatureVectorBuilder, SoilWeatherInputs,
};
pub use inference::{Prediction, PredictionService, YieldPredictor};
pub use summary::{AuthoritativeRegionSet, RegionYieldTable, SummaryService};
