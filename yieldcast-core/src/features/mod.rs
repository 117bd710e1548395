//! Feature engineering: schema registry, crop encoding, and vector building.

pub mod builder;
pub mod crop;
pub mod inputs;
pub mod schema;

pub use builder::{FeatureVector, FeatureVectorBuilder, SoilWeatherInputs, UNIT_AREA_HA};
pub use crop::{CROP_INDICATOR_PREFIX, CropType};
pub use inputs::{Bound, InputBounds};
pub use schema::{BASE_COLUMNS, FeatureSchema};
