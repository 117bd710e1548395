//! Historical data ingestion and process-lifetime caching.

pub mod cache;
pub mod source;

pub use cache::ResourceCell;
pub use source::{LoadReport, Observation, ObservationSource, ObservationTable};
