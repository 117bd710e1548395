//! Documented input ranges for soil and weather measurements.
//!
//! Range checks belong to input collection; the feature builder copies values
//! through untouched. Front ends call [`InputBounds::validate`] before building.

use crate::error::YieldError;
use crate::features::builder::SoilWeatherInputs;
use serde::{Deserialize, Serialize};

/// Inclusive range for one input field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
}

impl Bound {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Accepted range for each of the nine user inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputBounds {
    pub nitrogen: Bound,
    pub phosphorus: Bound,
    pub potassium: Bound,
    pub ph: Bound,
    pub rainfall: Bound,
    pub temperature: Bound,
    pub humidity: Bound,
    pub wind: Bound,
    pub radiation: Bound,
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            nitrogen: Bound::new(0.0, 200.0),
            phosphorus: Bound::new(0.0, 200.0),
            potassium: Bound::new(0.0, 200.0),
            ph: Bound::new(0.0, 14.0),
            rainfall: Bound::new(0.0, 3000.0),
            temperature: Bound::new(0.0, 50.0),
            humidity: Bound::new(0.0, 100.0),
            wind: Bound::new(0.0, 10.0),
            radiation: Bound::new(0.0, 30.0),
        }
    }
}

impl InputBounds {
    /// Reject (never clamp) the first out-of-range or non-finite field.
    pub fn validate(&self, inputs: &SoilWeatherInputs) -> Result<(), YieldError> {
        let checks = [
            ("nitrogen", inputs.nitrogen, self.nitrogen),
            ("phosphorus", inputs.phosphorus, self.phosphorus),
            ("potassium", inputs.potassium, self.potassium),
            ("ph", inputs.ph, self.ph),
            ("rainfall", inputs.rainfall, self.rainfall),
            ("temperature", inputs.temperature, self.temperature),
            ("humidity", inputs.humidity, self.humidity),
            ("wind", inputs.wind, self.wind),
            ("radiation", inputs.radiation, self.radiation),
        ];
        for (field, value, bound) in checks {
            if !bound.contains(value) {
                return Err(YieldError::invalid_input(format!(
                    "{field} = {value} is outside [{}, {}]",
                    bound.min, bound.max
                )));
            }
        }
        Ok(())
    }
}
