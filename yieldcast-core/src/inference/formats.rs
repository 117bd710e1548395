//! Model artifact format detection.

use crate::config::PythonConfig;
use crate::error::YieldError;
use crate::features::FeatureSchema;
use crate::inference::{LinearYieldModel, PythonPredictor, YieldPredictor};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported model artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    LinearJson,
    Pickle,
    Unknown,
}

/// Detect model format from file extension.
pub fn detect_format(path: &Path) -> ModelFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ModelFormat::LinearJson,
        Some("pkl" | "pickle" | "joblib") => ModelFormat::Pickle,
        _ => ModelFormat::Unknown,
    }
}

/// Open the predictor stored at `path`, aligned to `schema`.
pub fn load_predictor(
    path: &Path,
    schema: &FeatureSchema,
    python: &PythonConfig,
) -> Result<Box<dyn YieldPredictor>, YieldError> {
    match detect_format(path) {
        ModelFormat::LinearJson => Ok(Box::new(LinearYieldModel::load(path, schema)?)),
        ModelFormat::Pickle => {
            if !path.exists() {
                return Err(YieldError::model(format!(
                    "model artifact not found: {}",
                    path.display()
                )));
            }
            Ok(Box::new(PythonPredictor::new(path, schema, python)))
        }
        ModelFormat::Unknown => Err(YieldError::model(format!(
            "unsupported model artifact: {}",
            path.display()
        ))),
    }
}
