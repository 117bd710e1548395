//! Feature vector construction from raw soil/weather inputs and a crop.

use crate::error::YieldError;
use crate::features::crop::CropType;
use crate::features::schema::{
    COL_AREA, COL_HUMIDITY, COL_NITROGEN, COL_PH, COL_PHOSPHORUS, COL_POTASSIUM, COL_RADIATION,
    COL_RAINFALL, COL_TEMPERATURE, COL_WIND, FeatureSchema,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cultivated area every prediction is normalized to, in hectares.
pub const UNIT_AREA_HA: f64 = 1.0;

/// Raw scalar measurements for one prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilWeatherInputs {
    /// Nitrogen, kg/ha.
    pub nitrogen: f64,
    /// Phosphorus, kg/ha.
    pub phosphorus: f64,
    /// Potassium, kg/ha.
    pub potassium: f64,
    pub ph: f64,
    /// Rainfall, mm.
    pub rainfall: f64,
    /// Temperature, °C.
    pub temperature: f64,
    /// Relative humidity, %.
    pub humidity: f64,
    /// Wind speed, m/s.
    pub wind: f64,
    /// Solar radiation, MJ/m²/day.
    pub radiation: f64,
}

impl Default for SoilWeatherInputs {
    fn default() -> Self {
        Self {
            nitrogen: 90.0,
            phosphorus: 40.0,
            potassium: 40.0,
            ph: 6.5,
            rainfall: 1000.0,
            temperature: 27.0,
            humidity: 75.0,
            wind: 2.5,
            radiation: 18.0,
        }
    }
}

impl SoilWeatherInputs {
    /// Named non-crop values, area included.
    fn named_values(&self) -> [(&'static str, f64); 10] {
        [
            (COL_NITROGEN, self.nitrogen),
            (COL_PHOSPHORUS, self.phosphorus),
            (COL_POTASSIUM, self.potassium),
            (COL_PH, self.ph),
            (COL_RAINFALL, self.rainfall),
            (COL_TEMPERATURE, self.temperature),
            (COL_HUMIDITY, self.humidity),
            (COL_WIND, self.wind),
            (COL_RADIATION, self.radiation),
            (COL_AREA, UNIT_AREA_HA),
        ]
    }
}

/// One complete feature record, ordered exactly as its schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values[idx])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Builds feature vectors against a fixed schema.
///
/// Stateless apart from the schema: each call materializes a fresh indicator
/// slot for every crop, so nothing from a previous request can leak.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    schema: FeatureSchema,
}

impl FeatureVectorBuilder {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn build(
        &self,
        inputs: &SoilWeatherInputs,
        crop: CropType,
    ) -> Result<FeatureVector, YieldError> {
        let mut named: HashMap<String, f64> = HashMap::with_capacity(16);
        for (name, value) in inputs.named_values() {
            named.insert(name.to_string(), value);
        }
        for candidate in CropType::ALL {
            named.insert(candidate.indicator_column(), 0.0);
        }
        named.insert(crop.indicator_column(), 1.0);

        let mut columns = Vec::with_capacity(self.schema.len());
        let mut values = Vec::with_capacity(self.schema.len());
        for column in self.schema.columns() {
            let value = named.remove(column).ok_or_else(|| {
                YieldError::schema_mismatch(format!(
                    "schema column '{column}' has no value (not a known input or crop indicator)"
                ))
            })?;
            columns.push(column.clone());
            values.push(value);
        }

        if !named.is_empty() {
            let mut extra: Vec<String> = named.into_keys().collect();
            extra.sort();
            return Err(YieldError::schema_mismatch(format!(
                "schema is missing column(s): {}",
                extra.join(", ")
            )));
        }

        tracing::debug!(crop = %crop, columns = columns.len(), "Built feature vector");
        Ok(FeatureVector { columns, values })
    }
}
