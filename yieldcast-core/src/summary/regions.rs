//! The authoritative region list, read from boundary geometry.

use crate::error::YieldError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<GeoFeature>,
}

#[derive(Debug, Deserialize)]
struct GeoFeature {
    #[serde(default)]
    properties: serde_json::Map<String, serde_json::Value>,
}

/// Every region a map can render, in document order, without duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoritativeRegionSet {
    names: Vec<String>,
}

impl AuthoritativeRegionSet {
    /// Build from names directly. Later duplicates are dropped.
    pub fn from_names<I, S>(names: I) -> Result<Self, YieldError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for name in names {
            let name = name.into();
            if seen.insert(name.clone()) {
                unique.push(name);
            } else {
                tracing::warn!(region = name.as_str(), "Duplicate region name ignored");
            }
        }
        if unique.is_empty() {
            return Err(YieldError::data_load("authoritative region set is empty"));
        }
        Ok(Self { names: unique })
    }

    /// Parse a GeoJSON FeatureCollection, taking `name_property` from each feature.
    pub fn from_geojson(json: &str, name_property: &str) -> Result<Self, YieldError> {
        let collection: FeatureCollection = serde_json::from_str(json)
            .map_err(|e| YieldError::data_load(format!("invalid region geometry: {e}")))?;

        let names = collection
            .features
            .iter()
            .enumerate()
            .map(|(idx, feature)| {
                feature
                    .properties
                    .get(name_property)
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        YieldError::data_load(format!(
                            "feature {idx} has no string '{name_property}' property"
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_names(names)
    }

    pub fn load(path: &Path, name_property: &str) -> Result<Self, YieldError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            YieldError::data_load(format!(
                "failed to read region geometry {}: {e}",
                path.display()
            ))
        })?;
        let set = Self::from_geojson(&json, name_property)?;
        tracing::info!(
            path = %path.display(),
            regions = set.len(),
            "Loaded authoritative region set"
        );
        Ok(set)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, region: &str) -> bool {
        self.names.iter().any(|n| n == region)
    }
}
