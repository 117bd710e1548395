//! Yield prediction: the predictor contract and the prediction pipeline.
//!
//! The predictor itself is an opaque fitted artifact. This module only defines
//! how a feature vector is handed to it and how its answer comes back.

pub mod formats;
pub mod linear;
pub mod python;

pub use formats::{ModelFormat, detect_format, load_predictor};
pub use linear::LinearYieldModel;
pub use python::PythonPredictor;

use crate::error::YieldError;
use crate::features::{
    CropType, FeatureSchema, FeatureVector, FeatureVectorBuilder, SoilWeatherInputs,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit every predictor reports in.
pub const YIELD_UNIT: &str = "kg/hectare";

/// A fitted model that turns one feature row into one yield estimate.
pub trait YieldPredictor: Send + Sync {
    fn name(&self) -> &str;

    /// Columns, in order, that this predictor was fitted on.
    fn expected_columns(&self) -> &[String];

    /// Predict a yield for one row. Implementations must reject a vector whose
    /// columns differ from [`YieldPredictor::expected_columns`].
    fn predict(&self, features: &FeatureVector) -> Result<f64, YieldError>;
}

/// Reject `features` unless its columns match `expected` by name and position.
pub fn check_columns(expected: &[String], features: &FeatureVector) -> Result<(), YieldError> {
    if expected.len() != features.len() {
        return Err(YieldError::schema_mismatch(format!(
            "predictor expects {} columns, feature vector has {}",
            expected.len(),
            features.len()
        )));
    }
    for (idx, (want, got)) in expected.iter().zip(features.columns()).enumerate() {
        if want != got {
            return Err(YieldError::schema_mismatch(format!(
                "column {idx} is '{got}', predictor expects '{want}'"
            )));
        }
    }
    Ok(())
}

/// A single yield estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub crop: CropType,
    pub value: f64,
    pub unit: String,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

/// The standalone prediction pipeline: inputs -> feature vector -> predictor.
///
/// Holds no historical data or region geometry, so summary-side load failures
/// can never reach it.
pub struct PredictionService {
    builder: FeatureVectorBuilder,
    predictor: Box<dyn YieldPredictor>,
}

impl PredictionService {
    /// Pair a schema with a predictor, checking they agree up front.
    pub fn new(
        schema: FeatureSchema,
        predictor: Box<dyn YieldPredictor>,
    ) -> Result<Self, YieldError> {
        schema.verify(predictor.expected_columns())?;
        Ok(Self {
            builder: FeatureVectorBuilder::new(schema),
            predictor,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.builder.schema()
    }

    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }

    pub fn predict(
        &self,
        inputs: &SoilWeatherInputs,
        crop: CropType,
    ) -> Result<Prediction, YieldError> {
        let features = self.builder.build(inputs, crop)?;
        let value = self.predictor.predict(&features)?;
        if !value.is_finite() {
            return Err(YieldError::model(format!(
                "predictor '{}' returned a non-finite value",
                self.predictor.name()
            )));
        }
        tracing::info!(
            crop = %crop,
            predictor = self.predictor.name(),
            value,
            "Predicted yield"
        );
        Ok(Prediction {
            crop,
            value,
            unit: YIELD_UNIT.to_string(),
        })
    }
}
